//! Operation error types.

use thiserror::Error;

use crate::violation::Violations;

/// Result type for operation handling.
pub type OperationResult<T> = Result<T, OperationError>;

/// Errors that can occur while accepting a batch.
#[derive(Debug, Error)]
pub enum OperationError {
    /// One or more operations are incomplete. Every violation is listed.
    #[error("{violations}")]
    InvalidBatch { violations: Violations },
}

impl OperationError {
    pub fn invalid_batch(violations: Violations) -> Self {
        Self::InvalidBatch { violations }
    }

    pub fn violations(&self) -> &Violations {
        match self {
            Self::InvalidBatch { violations } => violations,
        }
    }
}
