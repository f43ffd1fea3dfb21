//! Predicate evaluation against base facts and partially-derived state.

use sw_model::derived::DerivedState;
use sw_model::facts::BaseFacts;
use sw_model::predicate::{NotOperand, Predicate};

/// What a predicate can see.
///
/// `derived` is absent when predicates are checked before any state has
/// been built; fact-only checks still work and state-only checks
/// (`hasProficiency`, `hasFeature`) are false.
#[derive(Debug, Clone, Copy)]
pub struct PredicateContext<'a> {
    /// Immutable player inputs.
    pub facts: &'a BaseFacts,
    /// State accumulated so far, if any.
    pub derived: Option<&'a DerivedState>,
}

impl<'a> PredicateContext<'a> {
    /// Context over facts only.
    pub fn facts(facts: &'a BaseFacts) -> Self {
        Self {
            facts,
            derived: None,
        }
    }

    /// Context over facts and in-progress state.
    pub fn with_state(facts: &'a BaseFacts, derived: &'a DerivedState) -> Self {
        Self {
            facts,
            derived: Some(derived),
        }
    }

    fn level(&self) -> u32 {
        self.derived
            .map_or_else(|| self.facts.total_level(), |d| d.level)
    }

    fn ability_score(&self, ability: sw_model::Ability) -> i32 {
        self.derived
            .and_then(|d| d.score(ability))
            .unwrap_or_else(|| self.facts.abilities.get(ability))
    }

    fn has_tag(&self, tag: &str) -> bool {
        match self.derived {
            Some(d) => d.has_tag(tag),
            None => self.facts.tags.iter().any(|t| t == tag),
        }
    }

    fn has_condition(&self, condition: &str) -> bool {
        self.facts.conditions.iter().any(|c| c == condition)
            || self.derived.is_some_and(|d| d.has_condition(condition))
    }
}

/// Logical AND over a list. An empty list is true.
pub fn evaluate_all(predicates: &[Predicate], ctx: &PredicateContext<'_>) -> bool {
    predicates.iter().all(|p| evaluate_one(p, ctx))
}

/// Evaluate a single predicate.
pub fn evaluate_one(predicate: &Predicate, ctx: &PredicateContext<'_>) -> bool {
    match predicate {
        Predicate::LevelAtLeast { level } => ctx.level() >= *level,
        Predicate::ClassLevelAtLeast { class, level } => ctx.facts.class_level(class) >= *level,
        Predicate::AbilityAtLeast { ability, score } => ctx.ability_score(*ability) >= *score,
        Predicate::HasTag { tag } => ctx.has_tag(tag),
        Predicate::HasProficiency { category, value } => ctx
            .derived
            .is_some_and(|d| d.proficiencies.contains(*category, value)),
        Predicate::ClassIs { class } => ctx.facts.class_level(class) > 0,
        Predicate::SpeciesIs { species } => ctx.facts.species.eq_ignore_ascii_case(species),
        Predicate::Edition { edition } => ctx.facts.edition == *edition,
        Predicate::HasFeat { feat } => ctx.facts.feats.iter().any(|f| f.eq_ignore_ascii_case(feat)),
        Predicate::HasFeature { feature } => ctx.derived.is_some_and(|d| d.has_feature(feature)),
        Predicate::Equipped { item } => ctx.facts.equipped.contains(item),
        Predicate::HasCondition { condition } => ctx.has_condition(condition),
        Predicate::And { predicates } => evaluate_all(predicates, ctx),
        Predicate::Or { predicates } => predicates.iter().any(|p| evaluate_one(p, ctx)),
        Predicate::Not { predicate } => match predicate {
            NotOperand::One(inner) => !evaluate_one(inner, ctx),
            NotOperand::Many(inner) => !evaluate_all(inner, ctx),
        },
        Predicate::Unknown => {
            tracing::warn!("unknown predicate type, treating as false");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_model::ability::{Ability, AbilityScores};
    use sw_model::derived::{AbilityRecord, Feature};
    use sw_model::effect::ProficiencyCategory;
    use sw_model::facts::Edition;

    fn facts() -> BaseFacts {
        let mut facts = BaseFacts::new("Barbarian", 5)
            .with_species("Dwarf")
            .with_edition(Edition::Edition2014)
            .with_abilities(AbilityScores::from_array([16, 14, 15, 8, 12, 10]));
        facts.tags.push("rage-capable".to_string());
        facts.feats.push("tough".to_string());
        facts.conditions.push("poisoned".to_string());
        facts.equipped.armor = Some("chain-mail".to_string());
        facts
    }

    fn tag(t: &str) -> Predicate {
        Predicate::HasTag { tag: t.to_string() }
    }

    #[test]
    fn empty_list_is_true() {
        let facts = facts();
        assert!(evaluate_all(&[], &PredicateContext::facts(&facts)));
    }

    #[test]
    fn simple_fact_predicates() {
        let facts = facts();
        let ctx = PredicateContext::facts(&facts);
        assert!(evaluate_one(&Predicate::LevelAtLeast { level: 5 }, &ctx));
        assert!(!evaluate_one(&Predicate::LevelAtLeast { level: 6 }, &ctx));
        assert!(evaluate_one(
            &Predicate::ClassLevelAtLeast {
                class: "barbarian".to_string(),
                level: 3
            },
            &ctx
        ));
        assert!(evaluate_one(&Predicate::ClassIs { class: "BARBARIAN".to_string() }, &ctx));
        assert!(!evaluate_one(&Predicate::ClassIs { class: "wizard".to_string() }, &ctx));
        assert!(evaluate_one(&Predicate::SpeciesIs { species: "dwarf".to_string() }, &ctx));
        assert!(evaluate_one(&Predicate::Edition { edition: Edition::Edition2014 }, &ctx));
        assert!(evaluate_one(&Predicate::HasFeat { feat: "Tough".to_string() }, &ctx));
        assert!(evaluate_one(&Predicate::Equipped { item: "chain-mail".to_string() }, &ctx));
        assert!(evaluate_one(&Predicate::HasCondition { condition: "poisoned".to_string() }, &ctx));
        assert!(evaluate_one(&tag("rage-capable"), &ctx));
    }

    #[test]
    fn ability_threshold_prefers_derived_scores() {
        let facts = facts();
        let check = Predicate::AbilityAtLeast {
            ability: Ability::Str,
            score: 17,
        };
        assert!(!evaluate_one(&check, &PredicateContext::facts(&facts)));

        let mut state = DerivedState::default();
        state.abilities.insert(Ability::Str, AbilityRecord::from_score(17));
        assert!(evaluate_one(&check, &PredicateContext::with_state(&facts, &state)));
    }

    #[test]
    fn ability_threshold_falls_back_to_facts() {
        let facts = facts();
        let state = DerivedState::default();
        let check = Predicate::AbilityAtLeast {
            ability: Ability::Dex,
            score: 14,
        };
        assert!(evaluate_one(&check, &PredicateContext::with_state(&facts, &state)));
    }

    #[test]
    fn state_only_predicates() {
        let facts = facts();
        let proficient = Predicate::HasProficiency {
            category: Some(ProficiencyCategory::Armor),
            value: "heavy".to_string(),
        };
        let feature = Predicate::HasFeature {
            feature: "rage".to_string(),
        };
        assert!(!evaluate_one(&proficient, &PredicateContext::facts(&facts)));

        let mut state = DerivedState::default();
        state.proficiencies.armor.push("Heavy".to_string());
        state.features.push(Feature {
            id: "rage".to_string(),
            name: "Rage".to_string(),
            description: None,
            source_id: "class:barbarian".to_string(),
        });
        let ctx = PredicateContext::with_state(&facts, &state);
        assert!(evaluate_one(&proficient, &ctx));
        assert!(evaluate_one(&feature, &ctx));
    }

    #[test]
    fn has_proficiency_matches_skill_ids() {
        let facts = facts();
        let mut state = DerivedState::default();
        state
            .proficiencies
            .insert(ProficiencyCategory::Skills, "Sleight of Hand");
        let ctx = PredicateContext::with_state(&facts, &state);
        for category in [Some(ProficiencyCategory::Skills), None] {
            let check = Predicate::HasProficiency {
                category,
                value: "sleightOfHand".to_string(),
            };
            assert!(evaluate_one(&check, &ctx), "category {category:?}");
        }
    }

    #[test]
    fn composites() {
        let facts = facts();
        let ctx = PredicateContext::facts(&facts);
        let yes = tag("rage-capable");
        let no = tag("spellcaster");

        assert!(evaluate_one(
            &Predicate::And {
                predicates: vec![yes.clone(), yes.clone()]
            },
            &ctx
        ));
        assert!(!evaluate_one(
            &Predicate::And {
                predicates: vec![yes.clone(), no.clone()]
            },
            &ctx
        ));
        assert!(evaluate_one(
            &Predicate::Or {
                predicates: vec![no.clone(), yes.clone()]
            },
            &ctx
        ));
        assert!(!evaluate_one(&Predicate::Or { predicates: vec![] }, &ctx));
        assert!(evaluate_one(&Predicate::not(no.clone()), &ctx));
        assert!(!evaluate_one(&Predicate::not(yes.clone()), &ctx));
    }

    #[test]
    fn not_over_list_negates_the_conjunction() {
        let facts = facts();
        let ctx = PredicateContext::facts(&facts);
        let not_both = Predicate::Not {
            predicate: NotOperand::Many(vec![tag("rage-capable"), tag("spellcaster")]),
        };
        assert!(evaluate_one(&not_both, &ctx));
    }

    #[test]
    fn unknown_predicate_is_false() {
        let facts = facts();
        let parsed: Predicate = serde_json::from_str(r#"{"type": "moonPhase"}"#).unwrap();
        assert_eq!(parsed, Predicate::Unknown);
        assert!(!evaluate_one(&parsed, &PredicateContext::facts(&facts)));
    }
}
