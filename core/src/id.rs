//! Identity types for cascade entities.
//!
//! All identifiers are opaque strings assigned by the store. Two provisional
//! identifiers exist for entities created within a batch before the store has
//! assigned a real id:
//! - `CorrelationId` for documents
//! - `TemplateId` for link instances

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier from a raw value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the raw value.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the raw value is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a document.
    DocumentId
);

string_id!(
    /// Unique identifier for a link instance.
    LinkId
);

string_id!(
    /// Identifier of the collection owning a document.
    CollectionId
);

string_id!(
    /// Identifier of the link type owning a link instance.
    LinkTypeId
);

string_id!(
    /// Identifier of an attribute within a collection or link type.
    AttributeId
);

string_id!(
    /// Identity of the user on whose behalf an automation runs.
    UserId
);

string_id!(
    /// Client-supplied provisional id of a document created within a batch.
    CorrelationId
);

string_id!(
    /// Client-supplied provisional id of a link created within a batch.
    TemplateId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_equality() {
        let id1 = DocumentId::new("d1");
        let id2 = DocumentId::from("d1");
        let id3 = DocumentId::new("d2");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_id_display_is_raw_value() {
        assert_eq!(LinkId::new("l7").to_string(), "l7");
        assert_eq!(CorrelationId::new("c1").as_str(), "c1");
    }

    #[test]
    fn test_empty_id() {
        assert!(CollectionId::new("").is_empty());
        assert!(!CollectionId::new("c").is_empty());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&AttributeId::new("a1")).unwrap();

        assert_eq!(json, "\"a1\"");
    }
}
