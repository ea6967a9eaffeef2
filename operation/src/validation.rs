//! Batch completeness checks.

use crate::error::{OperationError, OperationResult};
use crate::operation::Operation;
use crate::violation::{Violation, Violations};

/// Check every operation of a batch and the batch size.
///
/// All violations are collected before failing, so the caller sees every
/// invalid operation at once.
pub fn validate_batch(operations: &[Operation], max_operations: usize) -> OperationResult<()> {
    let mut violations = Violations::new();

    if operations.len() > max_operations {
        violations.push(Violation::for_batch(format!(
            "batch of {} operations exceeds the limit of {}",
            operations.len(),
            max_operations
        )));
    }

    for (index, operation) in operations.iter().enumerate() {
        if let Some(reason) = operation.incompleteness() {
            violations.push(Violation::for_operation(index, operation.to_string(), reason));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(OperationError::invalid_batch(violations))
    }
}
