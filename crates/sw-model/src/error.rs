//! Error types for parsing model names.

/// Alias for `Result<T, ModelError>`.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised when parsing model identifiers from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The text does not name one of the six abilities.
    #[error("unknown ability: \"{0}\"")]
    UnknownAbility(String),

    /// The text does not name one of the eighteen skills.
    #[error("unknown skill: \"{0}\"")]
    UnknownSkill(String),

    /// The text does not name a movement type.
    #[error("unknown movement type: \"{0}\"")]
    UnknownMovement(String),

    /// The text does not name a rules edition.
    #[error("unknown edition: \"{0}\"")]
    UnknownEdition(String),
}
