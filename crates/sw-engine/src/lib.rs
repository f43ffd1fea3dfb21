//! Effect evaluation for Sheetwright character sheets.
//!
//! Given a character's [`BaseFacts`](sw_model::BaseFacts) and a corpus of
//! sourced effects, the engine schedules the effects into phases, checks
//! each against its predicates, applies it to a [`DerivedState`]
//! accumulator, and finalizes the computed numbers. Every effect leaves a
//! provenance entry, applied or skipped, so a sheet can explain itself.
//!
//! Evaluation never fails on content: bad formulas resolve to 0, unknown
//! kinds are skipped, and missing prerequisites are recorded as skips.
//!
//! [`DerivedState`]: sw_model::DerivedState

/// Effect application, one handler per effect kind.
pub mod apply;
/// Engine configuration and the feature flag.
pub mod config;
/// Orchestration of a full evaluation run.
pub mod engine;
/// Error types.
pub mod error;
/// Finalization passes over the accumulator.
pub mod finalize;
/// Predicate evaluation.
pub mod predicate;
/// Phase assignment and ordering.
pub mod schedule;

pub use config::EngineConfig;
pub use engine::{Engine, evaluate, initialize};
pub use error::{EngineError, EngineResult};
pub use finalize::{finalize, finalize_with, resolve_armor_class};
pub use predicate::{PredicateContext, evaluate_all, evaluate_one};
pub use schedule::{Phase, Scheduled, phase_of, schedule};
