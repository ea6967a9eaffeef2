//! Rule error types.

use thiserror::Error;

/// Result type for rule operations.
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors raised by automation collaborators.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rule execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("Task scheduler unavailable: {message}")]
    SchedulerUnavailable { message: String },

    #[error("Rule state poisoned")]
    Poisoned,
}

impl RuleError {
    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            message: message.into(),
        }
    }

    pub fn scheduler_unavailable(message: impl Into<String>) -> Self {
        Self::SchedulerUnavailable {
            message: message.into(),
        }
    }
}
