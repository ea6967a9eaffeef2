//! Completeness violation types.

use std::fmt;

/// One incomplete operation in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Position of the operation in the batch, if the violation concerns one.
    pub index: Option<usize>,
    /// Human-readable description of the offending operation.
    pub operation: String,
    pub reason: String,
}

impl Violation {
    pub fn for_operation(
        index: usize,
        operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            index: Some(index),
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// A violation of the batch as a whole.
    pub fn for_batch(reason: impl Into<String>) -> Self {
        Self {
            index: None,
            operation: "batch".to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(
                f,
                "Invalid update request: #{} {} ({})",
                index, self.operation, self.reason
            ),
            None => write!(f, "Invalid update request: {}", self.reason),
        }
    }
}

/// Collection of violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn all(&self) -> &[Violation] {
        &self.violations
    }

    pub fn merge(&mut self, other: Violations) {
        self.violations.extend(other.violations);
    }
}

/// One line per violation.
impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_violation() {
        // GIVEN
        let mut violations = Violations::new();
        violations.push(Violation::for_operation(0, "DocumentUpdate(...)", "missing attribute"));
        violations.push(Violation::for_batch("too many operations"));

        // WHEN
        let text = violations.to_string();

        // THEN
        assert_eq!(
            text,
            "Invalid update request: #0 DocumentUpdate(...) (missing attribute)\n\
             Invalid update request: too many operations"
        );
    }

    #[test]
    fn test_merge() {
        let mut left = Violations::new();
        left.push(Violation::for_batch("a"));
        let mut right = Violations::new();
        right.push(Violation::for_batch("b"));

        left.merge(right);

        assert_eq!(left.len(), 2);
    }
}
