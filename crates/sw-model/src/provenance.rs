//! The provenance log: one entry per effect evaluated, in application order.
//!
//! The log is a first-class output. Every skip carries a typed
//! [`SkipReason`] so inspection tooling can filter without parsing text.

use serde::{Deserialize, Serialize};

use crate::ability::Ability;
use crate::facts::Edition;

/// Why an effect (or a whole sourced bundle) was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SkipReason {
    /// The bundle is restricted to another edition.
    EditionMismatch {
        /// Edition the bundle requires.
        required: Edition,
        /// Edition of the character.
        actual: Edition,
    },
    /// The player has not answered the choice yet.
    ChoicePending {
        /// Choice id.
        choice: String,
    },
    /// The choice's own predicates do not hold.
    ChoicePredicateFailed {
        /// Choice id.
        choice: String,
    },
    /// The recorded answer names an option the choice does not offer.
    UnknownOption {
        /// Choice id.
        choice: String,
        /// Unrecognized option id.
        option: String,
    },
    /// The effect's predicates do not hold.
    PredicateFailed,
    /// A spell grant arrived before any spellcasting ability was assigned.
    SpellcastingNotInitialized,
    /// Spellcasting was already assigned by an earlier effect.
    SpellcastingAlreadyAssigned {
        /// Ability already in use.
        ability: Ability,
    },
    /// A feature with this id was granted earlier.
    FeatureAlreadyGranted {
        /// Feature id.
        feature: String,
    },
    /// The value is outside the range the effect accepts.
    InvalidValue {
        /// What was wrong.
        message: String,
    },
    /// The effect kind is not known to this build.
    UnknownEffectKind,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EditionMismatch { required, actual } => {
                write!(f, "edition mismatch: requires {required}, character is {actual}")
            }
            Self::ChoicePending { choice } => write!(f, "choice pending: {choice}"),
            Self::ChoicePredicateFailed { choice } => {
                write!(f, "choice predicate failed: {choice}")
            }
            Self::UnknownOption { choice, option } => {
                write!(f, "unknown option \"{option}\" for choice {choice}")
            }
            Self::PredicateFailed => write!(f, "predicate failed"),
            Self::SpellcastingNotInitialized => write!(f, "spellcasting not initialized"),
            Self::SpellcastingAlreadyAssigned { ability } => {
                write!(f, "spellcasting already assigned ({ability})")
            }
            Self::FeatureAlreadyGranted { feature } => {
                write!(f, "feature already granted: {feature}")
            }
            Self::InvalidValue { message } => write!(f, "invalid value: {message}"),
            Self::UnknownEffectKind => write!(f, "unknown effect kind"),
        }
    }
}

/// The outcome of evaluating one effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceEntry {
    /// Source bundle id.
    pub source_id: String,
    /// Effect id (explicit, or `<sourceId>#<index>`).
    pub effect_id: String,
    /// Whether the effect changed (or was allowed to change) derived state.
    pub applied: bool,
    /// Why the effect was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
    /// Resolved numeric value, for numeric effects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
}

impl std::fmt::Display for ProvenanceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = if self.applied { "+" } else { "-" };
        write!(f, "{mark} {}", self.effect_id)?;
        if let Some(value) = self.value {
            write!(f, " = {value}")?;
        }
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

/// An append-only, ordered provenance log built over one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvenanceLog {
    entries: Vec<ProvenanceEntry>,
}

impl ProvenanceLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied effect.
    pub fn applied(&mut self, source_id: &str, effect_id: &str, value: Option<i32>) {
        self.entries.push(ProvenanceEntry {
            source_id: source_id.to_string(),
            effect_id: effect_id.to_string(),
            applied: true,
            reason: None,
            value,
        });
    }

    /// Record a skipped effect.
    pub fn skipped(&mut self, source_id: &str, effect_id: &str, reason: SkipReason) {
        self.entries.push(ProvenanceEntry {
            source_id: source_id.to_string(),
            effect_id: effect_id.to_string(),
            applied: false,
            reason: Some(reason),
            value: None,
        });
    }

    /// Entries recorded so far.
    pub fn entries(&self) -> &[ProvenanceEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the log.
    pub fn into_entries(self) -> Vec<ProvenanceEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_preserves_order() {
        let mut log = ProvenanceLog::new();
        log.applied("class:barbarian", "rage-1", Some(2));
        log.skipped("class:barbarian", "rage-3", SkipReason::PredicateFailed);
        assert_eq!(log.len(), 2);
        assert!(log.entries()[0].applied);
        assert_eq!(log.entries()[1].reason, Some(SkipReason::PredicateFailed));
    }

    #[test]
    fn entry_display() {
        let mut log = ProvenanceLog::new();
        log.applied("class:barbarian", "rage-1", Some(2));
        log.skipped(
            "feat:war-caster",
            "feat:war-caster",
            SkipReason::ChoicePending {
                choice: "asi-4".to_string(),
            },
        );
        let lines: Vec<String> = log.entries().iter().map(ToString::to_string).collect();
        assert_eq!(lines[0], "+ rage-1 = 2");
        assert_eq!(lines[1], "- feat:war-caster (choice pending: asi-4)");
    }

    #[test]
    fn reason_serializes_with_code() {
        let reason = SkipReason::UnknownOption {
            choice: "style".to_string(),
            option: "dueling".to_string(),
        };
        let json = serde_json::to_string(&reason).unwrap();
        assert_eq!(json, r#"{"code":"unknownOption","choice":"style","option":"dueling"}"#);
    }
}
