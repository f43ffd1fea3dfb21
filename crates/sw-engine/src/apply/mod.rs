//! The effect applier: guards a sourced effect, resolves its values, and
//! dispatches each entry to a handler by kind.
//!
//! Every entry evaluated produces exactly one provenance record, applied or
//! skipped, in evaluation order.

mod abilities;
mod defense;
mod proficiency;
mod resources;
mod spellcasting;
mod traits;

use sw_formula::FormulaContext;
use sw_model::derived::{DerivedState, insert_unique};
use sw_model::effect::{Effect, EffectKind};
use sw_model::facts::BaseFacts;
use sw_model::formula::NumericValue;
use sw_model::provenance::{ProvenanceLog, SkipReason};
use sw_model::sourced::{Choice, SourcedEffect};

use crate::predicate::{PredicateContext, evaluate_all};

/// Result of one handler: the resolved value on success, or why nothing
/// changed.
pub(crate) type Outcome = Result<Option<i32>, SkipReason>;

/// Snapshot of the state numbers formulas may reference.
pub fn formula_context(state: &DerivedState) -> FormulaContext {
    let mut ctx = FormulaContext::new()
        .with_proficiency_bonus(state.proficiency_bonus)
        .with_level(state.level);
    for (ability, record) in &state.abilities {
        ctx = ctx.with_score(*ability, record.score);
    }
    for (class, level) in &state.class_levels {
        ctx = ctx.with_class_level(class, *level);
    }
    for (movement, feet) in &state.speeds {
        ctx = ctx.with_speed(*movement, *feet);
    }
    ctx
}

/// Resolve a literal or formula against the current state.
pub fn resolve_value(value: &NumericValue, state: &DerivedState) -> i32 {
    match value {
        NumericValue::Literal(n) => *n,
        NumericValue::Formula(_) => sw_formula::resolve(value, &formula_context(state)),
    }
}

/// Apply one sourced effect to the accumulator.
pub fn apply(
    facts: &BaseFacts,
    state: &mut DerivedState,
    log: &mut ProvenanceLog,
    sourced: &SourcedEffect,
) {
    let source_id = sourced.source_id.as_str();

    if let Some(required) = sourced.edition
        && required != facts.edition
    {
        tracing::debug!(source = source_id, %required, "edition mismatch");
        log.skipped(
            source_id,
            source_id,
            SkipReason::EditionMismatch {
                required,
                actual: facts.edition,
            },
        );
        return;
    }

    match &sourced.choice {
        Some(choice) => apply_choice(facts, state, log, source_id, choice),
        None => apply_effects(facts, state, log, source_id, source_id, &sourced.effects),
    }
}

fn apply_choice(
    facts: &BaseFacts,
    state: &mut DerivedState,
    log: &mut ProvenanceLog,
    source_id: &str,
    choice: &Choice,
) {
    let Some(answer) = facts.choices.get(&choice.id) else {
        tracing::debug!(source = source_id, choice = %choice.id, "choice pending");
        log.skipped(
            source_id,
            source_id,
            SkipReason::ChoicePending {
                choice: choice.id.clone(),
            },
        );
        return;
    };

    if !evaluate_all(&choice.predicates, &PredicateContext::with_state(facts, state)) {
        log.skipped(
            source_id,
            source_id,
            SkipReason::ChoicePredicateFailed {
                choice: choice.id.clone(),
            },
        );
        return;
    }

    let mut selected: Vec<&str> = Vec::new();
    for selection in answer.selections() {
        insert_unique(&mut selected, selection);
    }
    if selected.len() > choice.count as usize {
        tracing::warn!(
            source = source_id,
            choice = %choice.id,
            count = choice.count,
            selected = selected.len(),
            "more options selected than the choice allows"
        );
    }

    for selection in selected {
        let prefix = format!("{source_id}/{selection}");
        match choice.option(selection) {
            Some(option) => apply_effects(facts, state, log, source_id, &prefix, &option.effects),
            None => {
                tracing::warn!(
                    source = source_id,
                    choice = %choice.id,
                    option = selection,
                    "answer names an option the choice does not offer"
                );
                log.skipped(
                    source_id,
                    &prefix,
                    SkipReason::UnknownOption {
                        choice: choice.id.clone(),
                        option: selection.to_string(),
                    },
                );
            }
        }
    }
}

/// Apply a list of effects. Entries without an explicit id are named
/// `<prefix>#<index>`.
fn apply_effects(
    facts: &BaseFacts,
    state: &mut DerivedState,
    log: &mut ProvenanceLog,
    source_id: &str,
    prefix: &str,
    effects: &[Effect],
) {
    for (index, effect) in effects.iter().enumerate() {
        let effect_id = effect
            .id
            .clone()
            .unwrap_or_else(|| format!("{prefix}#{index}"));

        if !evaluate_all(&effect.predicates, &PredicateContext::with_state(facts, state)) {
            tracing::debug!(source = source_id, effect = %effect_id, "predicate failed");
            log.skipped(source_id, &effect_id, SkipReason::PredicateFailed);
            continue;
        }

        match dispatch(state, source_id, &effect.kind) {
            Ok(value) => {
                tracing::debug!(
                    source = source_id,
                    effect = %effect_id,
                    kind = effect.kind.name(),
                    ?value,
                    "applied"
                );
                log.applied(source_id, &effect_id, value);
            }
            Err(reason) => {
                tracing::debug!(source = source_id, effect = %effect_id, %reason, "skipped");
                log.skipped(source_id, &effect_id, reason);
            }
        }
    }
}

fn dispatch(state: &mut DerivedState, source_id: &str, kind: &EffectKind) -> Outcome {
    match kind {
        EffectKind::GrantProficiency { category, values } => {
            proficiency::grant_proficiency(state, *category, values)
        }
        EffectKind::SkillProficiency { skills } => proficiency::skill_proficiency(state, skills),
        EffectKind::SkillExpertise { skills } => proficiency::skill_expertise(state, skills),
        EffectKind::SkillBonus {
            skill,
            value,
            stacking,
        } => proficiency::skill_bonus(state, *skill, value, *stacking),
        EffectKind::AbilityScoreIncrease {
            ability,
            value,
            maximum,
        } => abilities::ability_score_increase(state, *ability, value, *maximum),
        EffectKind::SavingThrowAdvantage { ability, mode } => {
            abilities::saving_throw_advantage(state, source_id, *ability, *mode)
        }
        EffectKind::SavingThrowBonus {
            ability,
            value,
            stacking,
        } => abilities::saving_throw_bonus(state, *ability, value, *stacking),
        EffectKind::ArmorClass {
            value,
            priority,
            stacking,
        } => defense::armor_class(state, source_id, value, *priority, *stacking),
        EffectKind::InitiativeBonus { value, stacking } => {
            defense::initiative_bonus(state, value, *stacking)
        }
        EffectKind::Speed {
            movement,
            value,
            stacking,
        } => defense::speed(state, *movement, value, *stacking),
        EffectKind::Sense { sense, range } => defense::sense(state, source_id, sense, range),
        EffectKind::HitPoints { value } => defense::hit_points(state, source_id, value),
        EffectKind::HitPointMaximum { value, per_level } => {
            defense::hit_point_maximum(state, source_id, value, *per_level)
        }
        EffectKind::Resource {
            resource,
            name,
            value,
            recharge,
            stacking,
        } => resources::resource(
            state,
            source_id,
            resources::ResourceGrant {
                id: resource,
                name: name.as_deref(),
                value,
                recharge: *recharge,
                stacking: *stacking,
            },
        ),
        EffectKind::Attunement { slots } => resources::attunement(state, slots),
        EffectKind::SpellcastingAbility { ability, class } => {
            spellcasting::spellcasting_ability(state, source_id, *ability, class.as_deref())
        }
        EffectKind::GrantSpell { spell, list } => spellcasting::grant_spell(state, spell, *list),
        EffectKind::SpellSlots {
            level,
            value,
            stacking,
        } => spellcasting::spell_slots(state, *level, value, *stacking),
        EffectKind::GrantFeature {
            feature,
            name,
            description,
        } => traits::grant_feature(
            state,
            source_id,
            feature,
            name.as_deref(),
            description.as_deref(),
        ),
        EffectKind::Tag { tags } => traits::tag(state, tags),
        EffectKind::EquipmentRestriction { category, values } => {
            traits::equipment_restriction(state, *category, values)
        }
        EffectKind::Condition { conditions } => traits::condition(state, conditions),
        EffectKind::DamageResistance { damage_types } => {
            traits::damage_resistance(state, damage_types)
        }
        EffectKind::ConditionImmunity { conditions } => {
            traits::condition_immunity(state, conditions)
        }
        EffectKind::Unknown => {
            tracing::warn!(source = source_id, "unknown effect kind, skipping");
            Err(SkipReason::UnknownEffectKind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_model::ability::{Ability, AbilityScores};
    use sw_model::derived::AbilityRecord;
    use sw_model::facts::{ChoiceAnswer, Edition};
    use sw_model::formula::Formula;
    use sw_model::predicate::Predicate;
    use sw_model::sourced::ChoiceOption;

    fn setup() -> (BaseFacts, DerivedState, ProvenanceLog) {
        let facts = BaseFacts::new("fighter", 1)
            .with_abilities(AbilityScores::from_array([15, 14, 13, 12, 10, 8]));
        let mut state = DerivedState {
            level: 1,
            proficiency_bonus: 2,
            ..DerivedState::default()
        };
        for ability in Ability::ALL {
            state
                .abilities
                .insert(ability, AbilityRecord::from_score(facts.abilities.get(ability)));
        }
        (facts, state, ProvenanceLog::new())
    }

    fn tag(tags: &[&str]) -> Effect {
        Effect::new(EffectKind::Tag {
            tags: tags.iter().map(|t| t.to_string()).collect(),
        })
    }

    #[test]
    fn edition_mismatch_skips_the_bundle() {
        let (facts, mut state, mut log) = setup();
        let sourced = SourcedEffect::new("species:elf", "Elf")
            .with_edition(Edition::Edition2014)
            .with_effect(tag(&["elf"]));
        apply(&facts, &mut state, &mut log, &sourced);
        assert!(state.tags.is_empty());
        assert_eq!(
            log.entries()[0].reason,
            Some(SkipReason::EditionMismatch {
                required: Edition::Edition2014,
                actual: Edition::Edition2024,
            })
        );
    }

    #[test]
    fn failed_predicate_skips_only_that_entry() {
        let (facts, mut state, mut log) = setup();
        let sourced = SourcedEffect::new("class:fighter", "Fighter")
            .with_effect(tag(&["a"]).when(Predicate::LevelAtLeast { level: 5 }))
            .with_effect(tag(&["b"]));
        apply(&facts, &mut state, &mut log, &sourced);
        assert_eq!(state.tags, vec!["b".to_string()]);
        let ids: Vec<&str> = log.entries().iter().map(|e| e.effect_id.as_str()).collect();
        assert_eq!(ids, vec!["class:fighter#0", "class:fighter#1"]);
        assert!(!log.entries()[0].applied);
        assert!(log.entries()[1].applied);
    }

    #[test]
    fn explicit_effect_ids_are_kept() {
        let (facts, mut state, mut log) = setup();
        let sourced =
            SourcedEffect::new("feat:alert", "Alert").with_effect(tag(&["alert"]).with_id("alert-tag"));
        apply(&facts, &mut state, &mut log, &sourced);
        assert_eq!(log.entries()[0].effect_id, "alert-tag");
    }

    #[test]
    fn pending_choice_applies_nothing() {
        let (facts, mut state, mut log) = setup();
        let sourced = SourcedEffect::new("class:fighter:style", "Fighting Style")
            .with_effect(tag(&["ignored"]))
            .with_choice(Choice::new("fighting-style", "Pick one").with_option(ChoiceOption::new(
                "defense",
                "Defense",
                vec![tag(&["defense"])],
            )));
        apply(&facts, &mut state, &mut log, &sourced);
        assert!(state.tags.is_empty());
        assert_eq!(log.len(), 1);
        assert_eq!(
            log.entries()[0].reason,
            Some(SkipReason::ChoicePending {
                choice: "fighting-style".to_string()
            })
        );
    }

    #[test]
    fn answered_choice_applies_selected_options_once() {
        let (facts, mut state, mut log) = setup();
        let facts = facts.with_choice(
            "languages",
            ChoiceAnswer::Many(vec![
                "elvish".to_string(),
                "dwarvish".to_string(),
                "elvish".to_string(),
                "abyssal".to_string(),
            ]),
        );
        let choice = Choice::new("languages", "Pick two")
            .with_count(2)
            .with_option(ChoiceOption::new("elvish", "Elvish", vec![tag(&["elvish"])]))
            .with_option(ChoiceOption::new("dwarvish", "Dwarvish", vec![tag(&["dwarvish"])]));
        let sourced = SourcedEffect::new("background:sage", "Sage").with_choice(choice);
        apply(&facts, &mut state, &mut log, &sourced);

        assert_eq!(state.tags, vec!["elvish".to_string(), "dwarvish".to_string()]);
        let ids: Vec<&str> = log.entries().iter().map(|e| e.effect_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "background:sage/elvish#0",
                "background:sage/dwarvish#0",
                "background:sage/abyssal"
            ]
        );
        assert!(matches!(
            log.entries()[2].reason,
            Some(SkipReason::UnknownOption { .. })
        ));
    }

    #[test]
    fn choice_predicates_gate_application() {
        let (facts, mut state, mut log) = setup();
        let facts = facts.with_choice("asi-4", "str".into());
        let choice = Choice::new("asi-4", "Ability Score Improvement")
            .when(Predicate::LevelAtLeast { level: 4 })
            .with_option(ChoiceOption::new("str", "Strength", vec![tag(&["str"])]));
        let sourced = SourcedEffect::new("class:fighter:asi", "ASI").with_choice(choice);
        apply(&facts, &mut state, &mut log, &sourced);
        assert!(state.tags.is_empty());
        assert_eq!(
            log.entries()[0].reason,
            Some(SkipReason::ChoicePredicateFailed {
                choice: "asi-4".to_string()
            })
        );
    }

    #[test]
    fn unknown_kind_is_recorded_not_applied() {
        let (facts, mut state, mut log) = setup();
        let sourced = SourcedEffect::new("item:boots", "Boots")
            .with_effect(Effect::new(EffectKind::Unknown));
        apply(&facts, &mut state, &mut log, &sourced);
        assert_eq!(log.entries()[0].reason, Some(SkipReason::UnknownEffectKind));
    }

    #[test]
    fn formula_values_see_current_state() {
        let (_, mut state, _) = setup();
        let value = NumericValue::Formula(Formula::new(
            "abilities.dex.modifier + proficiencyBonus",
            ["abilities.dex.modifier", "proficiencyBonus"],
        ));
        assert_eq!(resolve_value(&value, &state), 4);
        state.proficiency_bonus = 3;
        assert_eq!(resolve_value(&value, &state), 5);
    }
}
