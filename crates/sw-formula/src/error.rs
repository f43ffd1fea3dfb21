//! Formula error types.

use std::ops::Range;

use thiserror::Error;

/// Everything that can make a formula fail to produce a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// The expression contains a character no token starts with.
    #[error("{message}")]
    Lex {
        /// Byte range of the bad input.
        span: Range<usize>,
        /// Human-readable description.
        message: String,
    },

    /// The token stream is not a valid expression.
    #[error("{message}")]
    Parse {
        /// Byte range of the offending token.
        span: Range<usize>,
        /// Human-readable description.
        message: String,
    },

    /// A path is used but missing from the formula's `variables`.
    #[error("variable \"{name}\" is not declared by the formula")]
    UndeclaredVariable {
        /// The path as written.
        name: String,
        /// Byte range of the path.
        span: Range<usize>,
    },

    /// A call to a function outside the built-in set.
    #[error("unknown function \"{name}\"")]
    UnknownFunction {
        /// The function name as written.
        name: String,
        /// Byte range of the call.
        span: Range<usize>,
    },

    /// A built-in function called with the wrong number of arguments.
    #[error("{name}() expects {expected} argument(s), found {found}")]
    Arity {
        /// The function name.
        name: String,
        /// Accepted argument count, e.g. `"1"` or `"at least 1"`.
        expected: &'static str,
        /// Arguments actually passed.
        found: usize,
        /// Byte range of the call.
        span: Range<usize>,
    },

    /// Evaluation produced NaN or an infinity.
    #[error("formula evaluated to a non-finite number")]
    NonFinite,
}

impl FormulaError {
    /// Byte range of the problem in the expression text.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            Self::Lex { span, .. }
            | Self::Parse { span, .. }
            | Self::UndeclaredVariable { span, .. }
            | Self::UnknownFunction { span, .. }
            | Self::Arity { span, .. } => Some(span.clone()),
            Self::NonFinite => None,
        }
    }
}

/// Result alias for formula operations.
pub type FormulaResult<T> = Result<T, FormulaError>;
