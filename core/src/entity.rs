//! Entity structures for cascade.
//!
//! Documents live in collections; link instances connect exactly two documents
//! and belong to a link type. Drafts are the not-yet-persisted form handed to
//! the store for bulk creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    CollectionId, CorrelationId, DataDocument, DocumentId, LinkId, LinkTypeId, TemplateId, UserId,
    Value,
};

/// A persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier for this document.
    pub id: DocumentId,
    /// Collection owning this document.
    pub collection_id: CollectionId,
    /// Attribute values.
    pub data: DataDocument,
    pub created_by: Option<UserId>,
    pub creation_date: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
    pub update_date: Option<DateTime<Utc>>,
    /// Provisional id the document was created under, if any.
    pub correlation_id: Option<CorrelationId>,
    /// Back-reference to the parent document, if any.
    pub parent_id: Option<DocumentId>,
}

impl Document {
    /// Create a new document with the given properties.
    pub fn new(id: DocumentId, collection_id: CollectionId, data: DataDocument) -> Self {
        Self {
            id,
            collection_id,
            data,
            created_by: None,
            creation_date: None,
            updated_by: None,
            update_date: None,
            correlation_id: None,
            parent_id: None,
        }
    }

    /// Get an attribute value by id.
    pub fn get(&self, attribute_id: &str) -> Option<&Value> {
        self.data.get(attribute_id)
    }

    /// A copy of this document carrying different data.
    pub fn with_data(&self, data: DataDocument) -> Self {
        Self {
            data,
            ..self.clone()
        }
    }
}

/// A document that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub collection_id: CollectionId,
    pub data: DataDocument,
    pub created_by: Option<UserId>,
    pub creation_date: Option<DateTime<Utc>>,
    pub correlation_id: Option<CorrelationId>,
    pub parent_id: Option<DocumentId>,
}

impl DocumentDraft {
    pub fn new(collection_id: CollectionId, data: DataDocument) -> Self {
        Self {
            collection_id,
            data,
            created_by: None,
            creation_date: None,
            correlation_id: None,
            parent_id: None,
        }
    }

    /// Turn the draft into a document once the store assigned an id.
    pub fn into_document(self, id: DocumentId) -> Document {
        Document {
            id,
            collection_id: self.collection_id,
            data: self.data,
            created_by: self.created_by,
            creation_date: self.creation_date,
            updated_by: None,
            update_date: None,
            correlation_id: self.correlation_id,
            parent_id: self.parent_id,
        }
    }
}

/// A persisted link between two documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkInstance {
    /// Unique identifier for this link instance.
    pub id: LinkId,
    /// Link type owning this link instance.
    pub link_type_id: LinkTypeId,
    /// The two linked documents.
    pub document_ids: [DocumentId; 2],
    /// Attribute values.
    pub data: DataDocument,
    pub created_by: Option<UserId>,
    pub creation_date: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
    pub update_date: Option<DateTime<Utc>>,
    /// Provisional id the link was created under, if any.
    pub template_id: Option<TemplateId>,
}

impl LinkInstance {
    pub fn new(
        id: LinkId,
        link_type_id: LinkTypeId,
        document_ids: [DocumentId; 2],
        data: DataDocument,
    ) -> Self {
        Self {
            id,
            link_type_id,
            document_ids,
            data,
            created_by: None,
            creation_date: None,
            updated_by: None,
            update_date: None,
            template_id: None,
        }
    }

    /// Check if this link references a specific document.
    pub fn involves(&self, document_id: &DocumentId) -> bool {
        self.document_ids.contains(document_id)
    }

    /// A copy of this link carrying different data.
    pub fn with_data(&self, data: DataDocument) -> Self {
        Self {
            data,
            ..self.clone()
        }
    }
}

/// A link instance that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDraft {
    pub link_type_id: LinkTypeId,
    pub document_ids: [DocumentId; 2],
    pub data: DataDocument,
    pub created_by: Option<UserId>,
    pub creation_date: Option<DateTime<Utc>>,
    pub template_id: Option<TemplateId>,
}

impl LinkDraft {
    pub fn new(link_type_id: LinkTypeId, document_ids: [DocumentId; 2], data: DataDocument) -> Self {
        Self {
            link_type_id,
            document_ids,
            data,
            created_by: None,
            creation_date: None,
            template_id: None,
        }
    }

    /// Turn the draft into a link instance once the store assigned an id.
    pub fn into_link(self, id: LinkId) -> LinkInstance {
        LinkInstance {
            id,
            link_type_id: self.link_type_id,
            document_ids: self.document_ids,
            data: self.data,
            created_by: self.created_by,
            creation_date: self.creation_date,
            updated_by: None,
            update_date: None,
            template_id: self.template_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data;

    #[test]
    fn test_document_creation() {
        let document = Document::new("d1".into(), "c1".into(), data! { "a1" => "Alice" });

        assert_eq!(document.id, DocumentId::new("d1"));
        assert_eq!(document.collection_id, CollectionId::new("c1"));
        assert_eq!(document.get("a1"), Some(&Value::from("Alice")));
        assert!(document.created_by.is_none());
    }

    #[test]
    fn test_draft_keeps_correlation_id() {
        // GIVEN
        let mut draft = DocumentDraft::new("c1".into(), data! { "a1" => 1 });
        draft.correlation_id = Some(CorrelationId::new("corr-1"));

        // WHEN
        let document = draft.into_document(DocumentId::new("d9"));

        // THEN
        assert_eq!(document.id, DocumentId::new("d9"));
        assert_eq!(document.correlation_id, Some(CorrelationId::new("corr-1")));
        assert_eq!(document.data, data! { "a1" => 1 });
    }

    #[test]
    fn test_link_involves() {
        let link = LinkInstance::new(
            "l1".into(),
            "lt1".into(),
            ["d1".into(), "d2".into()],
            data!(),
        );

        assert!(link.involves(&DocumentId::new("d1")));
        assert!(link.involves(&DocumentId::new("d2")));
        assert!(!link.involves(&DocumentId::new("d3")));
    }

    #[test]
    fn test_with_data_replaces_only_data() {
        let document = Document::new("d1".into(), "c1".into(), data! { "a1" => 1 });

        let copy = document.with_data(data! { "a1" => 2 });

        assert_eq!(copy.id, document.id);
        assert_eq!(copy.data, data! { "a1" => 2 });
    }
}
