//! Error types for the evaluation engine.

/// Errors surfaced to callers of the engine.
///
/// Content problems never show up here: they are logged and recorded in
/// the provenance log instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The engine feature flag is off.
    #[error("effect engine is disabled by configuration")]
    Disabled,
}

/// Convenience result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
