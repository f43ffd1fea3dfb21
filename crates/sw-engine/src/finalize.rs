//! Finalization: turns accumulated contributions into final numbers.
//!
//! Every pass recomputes from data already on the state. The armor class
//! and hit point passes consume the deferred contribution lists, so a
//! second run without new contributions leaves them as they were.

use sw_model::ability::Ability;
use sw_model::derived::{AcContribution, ArmorClass, DerivedState, HpContributionKind};
use sw_model::effect::{AcPriority, StackingRule};

use crate::config::EngineConfig;

/// Finalize with the default configuration.
pub fn finalize(state: &mut DerivedState) {
    finalize_with(state, &EngineConfig::default());
}

/// Run every finalization pass.
pub fn finalize_with(state: &mut DerivedState, config: &EngineConfig) {
    finalize_saving_throws(state);
    finalize_skills(state);
    finalize_spellcasting(state);
    finalize_armor_class(state, config.base_armor_class);
    finalize_hit_points(state);
    finalize_initiative(state);
}

fn finalize_saving_throws(state: &mut DerivedState) {
    let proficiency = state.proficiency_bonus;
    for ability in Ability::ALL {
        let modifier = state.modifier(ability);
        let save = state.saving_throws.entry(ability).or_default();
        let trained = if save.proficient { proficiency } else { 0 };
        save.total = modifier.saturating_add(trained).saturating_add(save.bonus);
    }
}

fn finalize_skills(state: &mut DerivedState) {
    let proficiency = state.proficiency_bonus;
    let modifiers: Vec<(Ability, i32)> = Ability::ALL
        .into_iter()
        .map(|a| (a, state.modifier(a)))
        .collect();
    for record in state.skills.values_mut() {
        let modifier = modifiers
            .iter()
            .find(|(a, _)| *a == record.ability)
            .map_or(0, |(_, m)| *m);
        let trained = if record.proficient { proficiency } else { 0 };
        let expert = if record.expertise { proficiency } else { 0 };
        record.total = modifier
            .saturating_add(trained)
            .saturating_add(expert)
            .saturating_add(record.bonus);
    }
}

fn finalize_spellcasting(state: &mut DerivedState) {
    let proficiency = state.proficiency_bonus;
    let Some(ability) = state.spellcasting.as_ref().map(|c| c.ability) else {
        return;
    };
    let modifier = state.modifier(ability);
    if let Some(casting) = state.spellcasting.as_mut() {
        casting.attack_bonus = proficiency.saturating_add(modifier);
        casting.save_dc = casting.attack_bonus.saturating_add(8);
    }
}

fn finalize_armor_class(state: &mut DerivedState, base: i32) {
    let contributions = std::mem::take(&mut state.contributions.armor_class);
    if contributions.is_empty() && !state.armor_class.contributions.is_empty() {
        return;
    }
    let unarmored = base.saturating_add(state.modifier(Ability::Dex));
    state.armor_class = resolve_armor_class(unarmored, contributions);
}

/// Sum of `stack` values plus the largest `max` value.
fn stacked(tier: &[&AcContribution]) -> i32 {
    let sum: i32 = tier
        .iter()
        .filter(|c| c.stacking == StackingRule::Stack)
        .map(|c| c.value)
        .fold(0, i32::saturating_add);
    let best = tier
        .iter()
        .filter(|c| c.stacking == StackingRule::Max)
        .map(|c| c.value)
        .max()
        .unwrap_or(0);
    sum.saturating_add(best)
}

/// Resolve armor class contributions tier by tier, starting from the
/// unarmored value.
///
/// - `base`: the highest value replaces the running total.
/// - `additive`: the highest value wins; it competes with the `base`
///   result when there is one, otherwise it replaces the unarmored value.
/// - `multiplicative`: the total is multiplied by the product of `stack`
///   values and the largest `max` value.
/// - `override`: the last value replaces the total.
/// - `flag`: values are added per their stacking rule.
pub fn resolve_armor_class(unarmored: i32, contributions: Vec<AcContribution>) -> ArmorClass {
    let mut total = unarmored;
    let mut has_base = false;

    for priority in AcPriority::ORDER {
        let tier: Vec<&AcContribution> = contributions
            .iter()
            .filter(|c| c.priority == priority)
            .collect();
        let Some(highest) = tier.iter().map(|c| c.value).max() else {
            continue;
        };
        match priority {
            AcPriority::Base => {
                total = highest;
                has_base = true;
            }
            AcPriority::Additive => {
                total = if has_base { total.max(highest) } else { highest };
            }
            AcPriority::Multiplicative => {
                let product: i32 = tier
                    .iter()
                    .filter(|c| c.stacking == StackingRule::Stack)
                    .map(|c| c.value)
                    .fold(1, i32::saturating_mul);
                let largest = tier
                    .iter()
                    .filter(|c| c.stacking == StackingRule::Max)
                    .map(|c| c.value)
                    .max()
                    .unwrap_or(1);
                total = total.saturating_mul(product.saturating_mul(largest));
            }
            AcPriority::Override => {
                if let Some(last) = tier.last() {
                    total = last.value;
                }
            }
            AcPriority::Flag => total = total.saturating_add(stacked(&tier)),
        }
    }

    ArmorClass {
        value: total,
        contributions,
    }
}

fn finalize_hit_points(state: &mut DerivedState) {
    let contributions = std::mem::take(&mut state.contributions.hit_points);
    if contributions.is_empty() {
        return;
    }
    let sum = |kind: HpContributionKind| -> i32 {
        contributions
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.value)
            .fold(0, i32::saturating_add)
    };
    let base = sum(HpContributionKind::Base);
    let bonus = sum(HpContributionKind::Bonus);
    state.hit_points.base = base;
    state.hit_points.bonus = bonus;
    state.hit_points.max = base.saturating_add(bonus);
    state.hit_points.contributions = contributions;
}

fn finalize_initiative(state: &mut DerivedState) {
    state.initiative.total = state
        .modifier(Ability::Dex)
        .saturating_add(state.initiative.bonus);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_model::ability::Skill;
    use sw_model::derived::{AbilityRecord, HpContribution, SkillRecord, Spellcasting};

    fn state(scores: [i32; 6], proficiency: i32) -> DerivedState {
        let mut state = DerivedState {
            proficiency_bonus: proficiency,
            ..DerivedState::default()
        };
        for (ability, score) in Ability::ALL.into_iter().zip(scores) {
            state.abilities.insert(ability, AbilityRecord::from_score(score));
        }
        state
    }

    fn ac(source: &str, value: i32, priority: AcPriority, stacking: StackingRule) -> AcContribution {
        AcContribution {
            source_id: source.to_string(),
            value,
            priority,
            stacking,
        }
    }

    #[test]
    fn saving_throw_totals() {
        let mut state = state([16, 10, 14, 10, 10, 10], 2);
        state.saving_throws.entry(Ability::Str).or_default().proficient = true;
        state.saving_throws.entry(Ability::Con).or_default().bonus = 1;
        finalize(&mut state);
        assert_eq!(state.saving_throws[&Ability::Str].total, 5);
        assert_eq!(state.saving_throws[&Ability::Con].total, 3);
        assert_eq!(state.saving_throws[&Ability::Dex].total, 0);
    }

    #[test]
    fn expertise_doubles_proficiency() {
        let mut state = state([10, 10, 10, 10, 10, 18], 3);
        let mut record = SkillRecord::untrained(Skill::Persuasion);
        record.proficient = true;
        record.expertise = true;
        state.skills.insert(Skill::Persuasion, record);
        finalize(&mut state);
        assert_eq!(state.skills[&Skill::Persuasion].total, 10);
    }

    #[test]
    fn spell_save_dc() {
        let mut state = state([10, 10, 10, 10, 16, 10], 2);
        state.spellcasting = Some(Spellcasting::new(Ability::Wis, None, "class:cleric"));
        finalize(&mut state);
        let casting = state.spellcasting.as_ref().unwrap();
        assert_eq!(casting.save_dc, 13);
        assert_eq!(casting.attack_bonus, 5);
    }

    #[test]
    fn default_armor_class_is_ten_plus_dex() {
        let mut state = state([10, 14, 10, 10, 10, 10], 2);
        finalize(&mut state);
        assert_eq!(state.armor_class.value, 12);
        assert!(state.armor_class.contributions.is_empty());
    }

    #[test]
    fn higher_additive_wins_and_shield_stacks() {
        let resolved = resolve_armor_class(
            12,
            vec![
                ac("item:chain-mail", 16, AcPriority::Additive, StackingRule::Max),
                ac("class:monk", 15, AcPriority::Additive, StackingRule::Max),
            ],
        );
        assert_eq!(resolved.value, 16);

        let resolved = resolve_armor_class(
            12,
            vec![
                ac("item:chain-mail", 16, AcPriority::Additive, StackingRule::Max),
                ac("class:monk", 15, AcPriority::Additive, StackingRule::Max),
                ac("item:shield", 2, AcPriority::Flag, StackingRule::Stack),
            ],
        );
        assert_eq!(resolved.value, 18);
        assert_eq!(resolved.contributions.len(), 3);
    }

    #[test]
    fn flags_follow_their_stacking_rule() {
        let resolved = resolve_armor_class(
            10,
            vec![
                ac("item:ring", 1, AcPriority::Flag, StackingRule::Stack),
                ac("item:cloak", 1, AcPriority::Flag, StackingRule::Stack),
                ac("spell:shield-of-faith", 2, AcPriority::Flag, StackingRule::Max),
                ac("spell:haste", 1, AcPriority::Flag, StackingRule::Max),
            ],
        );
        assert_eq!(resolved.value, 14);
    }

    #[test]
    fn base_competes_with_additive() {
        let resolved = resolve_armor_class(
            11,
            vec![
                ac("species:tortle", 17, AcPriority::Base, StackingRule::Max),
                ac("item:leather", 12, AcPriority::Additive, StackingRule::Max),
            ],
        );
        assert_eq!(resolved.value, 17);
    }

    #[test]
    fn override_and_multiplier() {
        let resolved = resolve_armor_class(
            12,
            vec![
                ac("item:plate", 18, AcPriority::Additive, StackingRule::Max),
                ac("spell:barkskin", 16, AcPriority::Override, StackingRule::Max),
                ac("item:shield", 2, AcPriority::Flag, StackingRule::Stack),
            ],
        );
        assert_eq!(resolved.value, 18);

        let doubled = resolve_armor_class(
            12,
            vec![ac("homebrew:double", 2, AcPriority::Multiplicative, StackingRule::Stack)],
        );
        assert_eq!(doubled.value, 24);
    }

    #[test]
    fn finalize_twice_is_stable() {
        let mut state = state([10, 14, 16, 10, 10, 10], 2);
        state.contributions.armor_class.push(ac(
            "class:barbarian",
            15,
            AcPriority::Additive,
            StackingRule::Max,
        ));
        state.contributions.hit_points.push(HpContribution {
            source_id: "class:barbarian".to_string(),
            value: 15,
            kind: HpContributionKind::Base,
        });
        finalize(&mut state);
        let first = state.clone();
        finalize(&mut state);
        assert_eq!(state, first);
        assert_eq!(state.armor_class.value, 15);
        assert_eq!(state.hit_points.max, 15);
        assert!(state.contributions.armor_class.is_empty());
    }

    #[test]
    fn hit_points_sum_base_and_bonus() {
        let mut state = state([10; 6], 2);
        for (value, kind) in [
            (12, HpContributionKind::Base),
            (7, HpContributionKind::Base),
            (4, HpContributionKind::Bonus),
        ] {
            state.contributions.hit_points.push(HpContribution {
                source_id: "test".to_string(),
                value,
                kind,
            });
        }
        finalize(&mut state);
        assert_eq!(
            (state.hit_points.base, state.hit_points.bonus, state.hit_points.max),
            (19, 4, 23)
        );
    }

    #[test]
    fn initiative_adds_dex() {
        let mut state = state([10, 16, 10, 10, 10, 10], 2);
        state.initiative.bonus = 5;
        finalize(&mut state);
        assert_eq!(state.initiative.total, 8);
    }

    #[test]
    fn hit_point_totals_saturate() {
        let mut state = state([10; 6], 2);
        for value in [i32::MAX, 10] {
            state.contributions.hit_points.push(HpContribution {
                source_id: "test".to_string(),
                value,
                kind: HpContributionKind::Bonus,
            });
        }
        finalize(&mut state);
        assert_eq!(state.hit_points.bonus, i32::MAX);
        assert_eq!(state.hit_points.max, i32::MAX);
    }
}
