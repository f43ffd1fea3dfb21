//! Spellcasting handlers.
//!
//! Spell and slot grants require a prior `spellcastingAbility` effect.
//! Only the first ability assignment is kept, even across classes.

use sw_model::ability::Ability;
use sw_model::derived::{DerivedState, Spellcasting, insert_unique};
use sw_model::effect::{SpellList, StackingRule};
use sw_model::formula::NumericValue;
use sw_model::provenance::SkipReason;

use super::{Outcome, resolve_value};

pub(super) fn spellcasting_ability(
    state: &mut DerivedState,
    source_id: &str,
    ability: Ability,
    class: Option<&str>,
) -> Outcome {
    if let Some(existing) = &state.spellcasting {
        return Err(SkipReason::SpellcastingAlreadyAssigned {
            ability: existing.ability,
        });
    }
    state.spellcasting = Some(Spellcasting::new(
        ability,
        class.map(str::to_string),
        source_id,
    ));
    Ok(None)
}

pub(super) fn grant_spell(state: &mut DerivedState, spell: &str, list: SpellList) -> Outcome {
    let Some(casting) = state.spellcasting.as_mut() else {
        return Err(SkipReason::SpellcastingNotInitialized);
    };
    let bucket = match list {
        SpellList::Cantrips => &mut casting.cantrips,
        SpellList::Known => &mut casting.known,
        SpellList::Prepared => &mut casting.prepared,
        SpellList::AlwaysPrepared => &mut casting.always_prepared,
    };
    insert_unique(bucket, spell.to_string());
    Ok(None)
}

pub(super) fn spell_slots(
    state: &mut DerivedState,
    level: u8,
    value: &NumericValue,
    stacking: StackingRule,
) -> Outcome {
    if !(1..=9).contains(&level) {
        return Err(SkipReason::InvalidValue {
            message: format!("spell slot level {level} is outside 1-9"),
        });
    }
    let value = resolve_value(value, state);
    let Some(casting) = state.spellcasting.as_mut() else {
        return Err(SkipReason::SpellcastingNotInitialized);
    };
    let pool = casting.slots.entry(level).or_default();
    pool.max = stacking.combine(pool.max, value);
    pool.current = stacking.combine(pool.current, value);
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caster() -> DerivedState {
        let mut state = DerivedState::default();
        spellcasting_ability(&mut state, "class:cleric", Ability::Wis, Some("cleric")).unwrap();
        state
    }

    #[test]
    fn first_assignment_wins() {
        let mut state = caster();
        let second = spellcasting_ability(&mut state, "class:wizard", Ability::Int, Some("wizard"));
        assert_eq!(
            second,
            Err(SkipReason::SpellcastingAlreadyAssigned { ability: Ability::Wis })
        );
        let casting = state.spellcasting.as_ref().unwrap();
        assert_eq!(casting.ability, Ability::Wis);
        assert_eq!(casting.source_id, "class:cleric");
    }

    #[test]
    fn grants_require_spellcasting() {
        let mut state = DerivedState::default();
        assert_eq!(
            grant_spell(&mut state, "bless", SpellList::Prepared),
            Err(SkipReason::SpellcastingNotInitialized)
        );
        assert_eq!(
            spell_slots(&mut state, 1, &NumericValue::Literal(2), StackingRule::Stack),
            Err(SkipReason::SpellcastingNotInitialized)
        );
        assert!(state.spellcasting.is_none());
    }

    #[test]
    fn spells_land_in_their_bucket() {
        let mut state = caster();
        grant_spell(&mut state, "guidance", SpellList::Cantrips).unwrap();
        grant_spell(&mut state, "bless", SpellList::AlwaysPrepared).unwrap();
        grant_spell(&mut state, "bless", SpellList::AlwaysPrepared).unwrap();
        let casting = state.spellcasting.as_ref().unwrap();
        assert_eq!(casting.cantrips, vec!["guidance"]);
        assert_eq!(casting.always_prepared, vec!["bless"]);
        assert!(casting.known.is_empty());
    }

    #[test]
    fn slot_rows_accumulate() {
        let mut state = caster();
        for _ in 0..2 {
            spell_slots(&mut state, 1, &NumericValue::Literal(2), StackingRule::Stack).unwrap();
        }
        spell_slots(&mut state, 2, &NumericValue::Literal(2), StackingRule::Max).unwrap();
        spell_slots(&mut state, 2, &NumericValue::Literal(1), StackingRule::Max).unwrap();
        let slots = &state.spellcasting.as_ref().unwrap().slots;
        assert_eq!(slots[&1].max, 4);
        assert_eq!(slots[&2].current, 2);
    }

    #[test]
    fn slot_level_out_of_range() {
        let mut state = caster();
        let outcome = spell_slots(&mut state, 10, &NumericValue::Literal(1), StackingRule::Stack);
        assert!(matches!(outcome, Err(SkipReason::InvalidValue { .. })));
    }
}
