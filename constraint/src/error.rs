//! Constraint error types.

use thiserror::Error;

/// Result type for constraint operations.
pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Errors raised while building a codec.
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("Invalid value pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl ConstraintError {
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}
