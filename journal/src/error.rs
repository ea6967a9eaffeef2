//! Audit error types.

use thiserror::Error;

/// Audit errors.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The sink could not record the entry.
    #[error("audit sink unavailable: {message}")]
    Unavailable { message: String },

    /// A writer panicked while holding the log.
    #[error("audit log poisoned")]
    Poisoned,
}

impl AuditError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
