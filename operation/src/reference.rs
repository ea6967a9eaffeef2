//! References to entities that may not exist yet.

use std::fmt;

use serde::{Deserialize, Serialize};

use cascade_core::{CorrelationId, DocumentId, LinkId, TemplateId};

/// A document reference: a real id, or the correlation id of a document
/// created earlier in the same batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DocumentRef {
    Existing(DocumentId),
    Pending(CorrelationId),
}

impl DocumentRef {
    pub fn existing(id: impl Into<DocumentId>) -> Self {
        Self::Existing(id.into())
    }

    pub fn pending(id: impl Into<CorrelationId>) -> Self {
        Self::Pending(id.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Existing(id) => id.as_str(),
            Self::Pending(id) => id.as_str(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl From<DocumentId> for DocumentRef {
    fn from(id: DocumentId) -> Self {
        Self::Existing(id)
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing(id) => write!(f, "{}", id),
            Self::Pending(id) => write!(f, "pending:{}", id),
        }
    }
}

/// A link reference: a real id, or the template id of a link created earlier
/// in the same batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum LinkRef {
    Existing(LinkId),
    Pending(TemplateId),
}

impl LinkRef {
    pub fn existing(id: impl Into<LinkId>) -> Self {
        Self::Existing(id.into())
    }

    pub fn pending(id: impl Into<TemplateId>) -> Self {
        Self::Pending(id.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Existing(id) => id.as_str(),
            Self::Pending(id) => id.as_str(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl From<LinkId> for LinkRef {
    fn from(id: LinkId) -> Self {
        Self::Existing(id)
    }
}

impl fmt::Display for LinkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing(id) => write!(f, "{}", id),
            Self::Pending(id) => write!(f, "pending:{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_marks_pending() {
        assert_eq!(DocumentRef::existing("d1").to_string(), "d1");
        assert_eq!(DocumentRef::pending("c1").to_string(), "pending:c1");
        assert_eq!(LinkRef::pending("t1").to_string(), "pending:t1");
    }

    #[test]
    fn test_empty_reference() {
        assert!(DocumentRef::existing("").is_empty());
        assert!(!LinkRef::existing("l1").is_empty());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(DocumentRef::pending("c1")).unwrap();

        assert_eq!(json, serde_json::json!({ "kind": "pending", "id": "c1" }));
    }
}
