//! Conditional guards over character state.
//!
//! Predicates are pure data; the evaluator lives in `sw-engine`. An effect
//! with an empty predicate list is unconditional.

use serde::{Deserialize, Serialize};

use crate::ability::Ability;
use crate::effect::ProficiencyCategory;
use crate::facts::Edition;

/// A boolean guard: a simple fact comparison or an AND/OR/NOT composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Predicate {
    /// Total character level is at least `level`.
    LevelAtLeast {
        /// Minimum total level.
        level: u32,
    },
    /// Level in one class track is at least `level`.
    ClassLevelAtLeast {
        /// Class identifier.
        class: String,
        /// Minimum class level.
        level: u32,
    },
    /// An ability score is at least `score`.
    AbilityAtLeast {
        /// Ability to test.
        ability: Ability,
        /// Minimum score.
        score: i32,
    },
    /// The character carries a tag.
    HasTag {
        /// Tag to look for.
        tag: String,
    },
    /// The character is proficient with something, optionally in one category.
    HasProficiency {
        /// Restrict the lookup to one category.
        #[serde(default)]
        category: Option<ProficiencyCategory>,
        /// Proficiency value, e.g. "heavy armor" or "athletics".
        value: String,
    },
    /// The character has at least one level in a class.
    ClassIs {
        /// Class identifier.
        class: String,
    },
    /// The character is of a species.
    SpeciesIs {
        /// Species identifier.
        species: String,
    },
    /// The character is built under an edition.
    Edition {
        /// Required edition.
        edition: Edition,
    },
    /// The character has a feat.
    HasFeat {
        /// Feat identifier.
        feat: String,
    },
    /// The character has been granted a feature.
    HasFeature {
        /// Feature identifier.
        feature: String,
    },
    /// An item, armor, shield, or weapon is equipped.
    Equipped {
        /// Equipment identifier.
        item: String,
    },
    /// A condition is active.
    HasCondition {
        /// Condition identifier.
        condition: String,
    },
    /// All nested predicates hold.
    And {
        /// Nested predicates.
        predicates: Vec<Predicate>,
    },
    /// At least one nested predicate holds.
    Or {
        /// Nested predicates.
        predicates: Vec<Predicate>,
    },
    /// The nested predicate (or the AND of a nested list) does not hold.
    Not {
        /// Negated operand.
        predicate: NotOperand,
    },
    /// A predicate type this build does not know. Always false.
    #[serde(other)]
    Unknown,
}

impl Predicate {
    /// Negate a single predicate.
    pub fn not(inner: Predicate) -> Self {
        Self::Not {
            predicate: NotOperand::One(Box::new(inner)),
        }
    }

    /// The serialized tag of this predicate, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::LevelAtLeast { .. } => "levelAtLeast",
            Self::ClassLevelAtLeast { .. } => "classLevelAtLeast",
            Self::AbilityAtLeast { .. } => "abilityAtLeast",
            Self::HasTag { .. } => "hasTag",
            Self::HasProficiency { .. } => "hasProficiency",
            Self::ClassIs { .. } => "classIs",
            Self::SpeciesIs { .. } => "speciesIs",
            Self::Edition { .. } => "edition",
            Self::HasFeat { .. } => "hasFeat",
            Self::HasFeature { .. } => "hasFeature",
            Self::Equipped { .. } => "equipped",
            Self::HasCondition { .. } => "hasCondition",
            Self::And { .. } => "and",
            Self::Or { .. } => "or",
            Self::Not { .. } => "not",
            Self::Unknown => "unknown",
        }
    }
}

/// Operand of a `not` predicate: one predicate, or a list treated as AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotOperand {
    /// A list of predicates, combined with AND before negation.
    Many(Vec<Predicate>),
    /// A single predicate.
    One(Box<Predicate>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_simple_predicates() {
        let p: Predicate =
            serde_json::from_str(r#"{"type": "classLevelAtLeast", "class": "barbarian", "level": 3}"#)
                .unwrap();
        assert_eq!(
            p,
            Predicate::ClassLevelAtLeast {
                class: "barbarian".to_string(),
                level: 3
            }
        );

        let p: Predicate = serde_json::from_str(r#"{"type": "edition", "edition": "2014"}"#).unwrap();
        assert_eq!(
            p,
            Predicate::Edition {
                edition: Edition::Edition2014
            }
        );
    }

    #[test]
    fn deserialize_not_with_single_or_list() {
        let one: Predicate = serde_json::from_str(
            r#"{"type": "not", "predicate": {"type": "hasTag", "tag": "wearing-armor"}}"#,
        )
        .unwrap();
        assert!(matches!(
            one,
            Predicate::Not {
                predicate: NotOperand::One(_)
            }
        ));

        let many: Predicate = serde_json::from_str(
            r#"{"type": "not", "predicate": [{"type": "hasTag", "tag": "a"}, {"type": "hasTag", "tag": "b"}]}"#,
        )
        .unwrap();
        match many {
            Predicate::Not {
                predicate: NotOperand::Many(list),
            } => assert_eq!(list.len(), 2),
            other => panic!("expected list operand, got {other:?}"),
        }
    }

    #[test]
    fn unknown_type_deserializes_to_unknown() {
        let p: Predicate =
            serde_json::from_str(r#"{"type": "moonPhaseIs", "phase": "full"}"#).unwrap();
        assert_eq!(p, Predicate::Unknown);
        assert_eq!(p.type_name(), "unknown");
    }
}
