//! Armor class, hit points, initiative, movement, and senses.
//!
//! Armor class and hit points are deferred: handlers only record
//! contributions and the finalizer resolves them.

use sw_model::derived::{
    AcContribution, DerivedState, HpContribution, HpContributionKind, Sense, insert_unique,
};
use sw_model::effect::{AcPriority, MovementType, StackingRule};
use sw_model::formula::NumericValue;
use sw_model::provenance::SkipReason;

use super::{Outcome, resolve_value};

pub(super) fn armor_class(
    state: &mut DerivedState,
    source_id: &str,
    value: &NumericValue,
    priority: AcPriority,
    stacking: StackingRule,
) -> Outcome {
    let value = resolve_value(value, state);
    state.contributions.armor_class.push(AcContribution {
        source_id: source_id.to_string(),
        value,
        priority,
        stacking,
    });
    Ok(Some(value))
}

pub(super) fn initiative_bonus(
    state: &mut DerivedState,
    value: &NumericValue,
    stacking: StackingRule,
) -> Outcome {
    let value = resolve_value(value, state);
    state.initiative.bonus = stacking.combine(state.initiative.bonus, value);
    Ok(Some(value))
}

/// The first grant for a movement type sets it; later grants combine.
pub(super) fn speed(
    state: &mut DerivedState,
    movement: MovementType,
    value: &NumericValue,
    stacking: StackingRule,
) -> Outcome {
    let value = resolve_value(value, state);
    let next = state
        .speeds
        .get(&movement)
        .map_or(value, |current| stacking.combine(*current, value));
    state.speeds.insert(movement, next);
    Ok(Some(value))
}

/// Senses keep their longest range.
pub(super) fn sense(
    state: &mut DerivedState,
    source_id: &str,
    sense: &str,
    range: &NumericValue,
) -> Outcome {
    let range = resolve_value(range, state);
    if range < 0 {
        return Err(SkipReason::InvalidValue {
            message: format!("{sense} range {range} is negative"),
        });
    }
    match state
        .senses
        .iter_mut()
        .find(|s| s.sense.eq_ignore_ascii_case(sense))
    {
        Some(existing) => {
            existing.range = existing.range.max(range);
            insert_unique(&mut existing.sources, source_id.to_string());
        }
        None => state.senses.push(Sense {
            sense: sense.to_string(),
            range,
            sources: vec![source_id.to_string()],
        }),
    }
    Ok(Some(range))
}

pub(super) fn hit_points(state: &mut DerivedState, source_id: &str, value: &NumericValue) -> Outcome {
    let value = resolve_value(value, state);
    state.contributions.hit_points.push(HpContribution {
        source_id: source_id.to_string(),
        value,
        kind: HpContributionKind::Base,
    });
    Ok(Some(value))
}

pub(super) fn hit_point_maximum(
    state: &mut DerivedState,
    source_id: &str,
    value: &NumericValue,
    per_level: bool,
) -> Outcome {
    let mut value = resolve_value(value, state);
    if per_level {
        value = value.saturating_mul(i32::try_from(state.level).unwrap_or(i32::MAX));
    }
    state.contributions.hit_points.push(HpContribution {
        source_id: source_id.to_string(),
        value,
        kind: HpContributionKind::Bonus,
    });
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armor_class_is_deferred() {
        let mut state = DerivedState::default();
        armor_class(
            &mut state,
            "item:chain-mail",
            &NumericValue::Literal(16),
            AcPriority::Additive,
            StackingRule::Max,
        )
        .unwrap();
        assert_eq!(state.armor_class.value, 0);
        assert_eq!(state.contributions.armor_class.len(), 1);
        assert_eq!(state.contributions.armor_class[0].value, 16);
    }

    #[test]
    fn speeds_set_then_combine() {
        let mut state = DerivedState::default();
        let walk = MovementType::Walk;
        speed(&mut state, walk, &NumericValue::Literal(30), StackingRule::Max).unwrap();
        speed(&mut state, walk, &NumericValue::Literal(25), StackingRule::Max).unwrap();
        assert_eq!(state.speeds[&walk], 30);
        speed(&mut state, walk, &NumericValue::Literal(10), StackingRule::Stack).unwrap();
        assert_eq!(state.speeds[&walk], 40);
    }

    #[test]
    fn senses_keep_longest_range() {
        let mut state = DerivedState::default();
        sense(&mut state, "species:elf", "darkvision", &NumericValue::Literal(60)).unwrap();
        sense(&mut state, "feat:shadow", "Darkvision", &NumericValue::Literal(120)).unwrap();
        sense(&mut state, "species:elf", "darkvision", &NumericValue::Literal(30)).unwrap();
        assert_eq!(state.senses.len(), 1);
        assert_eq!(state.senses[0].range, 120);
        assert_eq!(state.senses[0].sources, vec!["species:elf", "feat:shadow"]);
    }

    #[test]
    fn negative_sense_range_is_rejected() {
        let mut state = DerivedState::default();
        let outcome = sense(&mut state, "item:x", "blindsight", &NumericValue::Literal(-5));
        assert!(matches!(outcome, Err(SkipReason::InvalidValue { .. })));
        assert!(state.senses.is_empty());
    }

    #[test]
    fn per_level_hit_points_scale() {
        let mut state = DerivedState {
            level: 4,
            ..DerivedState::default()
        };
        let outcome = hit_point_maximum(&mut state, "feat:tough", &NumericValue::Literal(2), true);
        assert_eq!(outcome, Ok(Some(8)));
        assert_eq!(state.contributions.hit_points[0].kind, HpContributionKind::Bonus);
    }
}
