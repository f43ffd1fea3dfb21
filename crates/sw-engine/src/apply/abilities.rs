//! Ability score and saving throw handlers.

use sw_model::ability::Ability;
use sw_model::derived::{AbilityRecord, DerivedState, insert_unique};
use sw_model::effect::{AbilityTarget, RollMode, StackingRule};
use sw_model::formula::NumericValue;

use super::{Outcome, resolve_value};

/// Add a delta to one score, never raising it past `maximum`, then refresh
/// every modifier so later formulas see the new values.
pub(super) fn ability_score_increase(
    state: &mut DerivedState,
    ability: Ability,
    value: &NumericValue,
    maximum: Option<i32>,
) -> Outcome {
    let delta = resolve_value(value, state);
    let record = state
        .abilities
        .entry(ability)
        .or_insert_with(|| AbilityRecord::from_score(10));
    let mut score = record.score.saturating_add(delta);
    if let Some(cap) = maximum {
        // an existing score above the cap is left alone
        score = score.min(cap.max(record.score));
    }
    record.score = score;
    state.recompute_modifiers();
    Ok(Some(delta))
}

pub(super) fn saving_throw_advantage(
    state: &mut DerivedState,
    source_id: &str,
    target: AbilityTarget,
    mode: RollMode,
) -> Outcome {
    for ability in target.abilities() {
        let save = state.saving_throws.entry(ability).or_default();
        let sources = match mode {
            RollMode::Advantage => &mut save.advantage,
            RollMode::Disadvantage => &mut save.disadvantage,
        };
        insert_unique(sources, source_id.to_string());
    }
    Ok(None)
}

pub(super) fn saving_throw_bonus(
    state: &mut DerivedState,
    target: AbilityTarget,
    value: &NumericValue,
    stacking: StackingRule,
) -> Outcome {
    let value = resolve_value(value, state);
    for ability in target.abilities() {
        let save = state.saving_throws.entry(ability).or_default();
        save.bonus = stacking.combine(save.bonus, value);
    }
    Ok(Some(value))
}
