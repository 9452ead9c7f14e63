//! Error types for the boolean expression engine

#[cfg(feature = "python")]
use pyo3::exceptions::{PyKeyError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;
use std::fmt;
use thiserror::Error;

/// What the parser was looking for when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// An identifier, `(`, `!` or `~`
    Operand,
    /// A closing parenthesis or a binary operator
    CloseParenOrOperator,
    /// A closing parenthesis
    CloseParen,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Operand => write!(f, "identifier, '(', '!' or '~'"),
            Expected::CloseParenOrOperator => write!(f, "')', '&', '|' or '^'"),
            Expected::CloseParen => write!(f, "')'"),
        }
    }
}

/// Main error type for the expression engine
#[derive(Error, Debug)]
pub enum ExpressionError {
    #[error("Unexpected character '{found}' at position {position}: expected {expected}")]
    UnexpectedCharacter {
        found: char,
        position: usize,
        expected: Expected,
    },

    #[error("Unexpected end of expression at position {position}: expected {expected}")]
    UnexpectedEnd { position: usize, expected: Expected },

    #[error("Unexpected character '{found}' at position {position} after end of expression")]
    TrailingInput { found: char, position: usize },

    #[error("Expression nesting exceeds limit of {limit} at position {position}")]
    NestingTooDeep { limit: usize, position: usize },

    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl ExpressionError {
    /// True when the error describes malformed expression text
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ExpressionError::UnexpectedCharacter { .. }
                | ExpressionError::UnexpectedEnd { .. }
                | ExpressionError::TrailingInput { .. }
                | ExpressionError::NestingTooDeep { .. }
        )
    }

    /// Character offset of a parse error, if any
    pub fn position(&self) -> Option<usize> {
        match self {
            ExpressionError::UnexpectedCharacter { position, .. }
            | ExpressionError::UnexpectedEnd { position, .. }
            | ExpressionError::TrailingInput { position, .. }
            | ExpressionError::NestingTooDeep { position, .. } => Some(*position),
            _ => None,
        }
    }
}

#[cfg(feature = "python")]
impl From<ExpressionError> for PyErr {
    fn from(err: ExpressionError) -> PyErr {
        match err {
            ExpressionError::UnknownIdentifier(id) => {
                PyKeyError::new_err(format!("Unknown identifier: {}", id))
            }
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

/// Result type alias for the expression engine
pub type Result<T> = std::result::Result<T, ExpressionError>;
