//! Data contracts for Sheetwright.
//!
//! This crate defines the two inputs of an evaluation ([`BaseFacts`] and
//! [`SourcedEffect`] corpora) and its single output ([`DerivedState`]).
//! It holds no evaluation logic beyond the two rules laws every consumer
//! needs: [`ability_modifier`] and [`proficiency_bonus`].

/// Abilities, skills, and the modifier and proficiency laws.
pub mod ability;
/// The derived-state accumulator and its records.
pub mod derived;
/// Effect entries and their closed set of kinds.
pub mod effect;
/// Error types used throughout the crate.
pub mod error;
/// Player-chosen base facts.
pub mod facts;
/// Formula-valued numeric fields.
pub mod formula;
/// Conditional guards over character state.
pub mod predicate;
/// The ordered audit trail of an evaluation.
pub mod provenance;
/// Sourced effect bundles and player choices.
pub mod sourced;

pub use ability::{Ability, AbilityScores, Skill, ability_modifier, proficiency_bonus};
pub use derived::DerivedState;
pub use effect::{AcPriority, Effect, EffectKind, StackingRule};
pub use error::{ModelError, ModelResult};
pub use facts::{BaseFacts, ChoiceAnswer, Edition, Equipment};
pub use formula::{Formula, NumericValue};
pub use predicate::{NotOperand, Predicate};
pub use provenance::{ProvenanceEntry, ProvenanceLog, SkipReason};
pub use sourced::{Choice, ChoiceOption, SourcedEffect};
