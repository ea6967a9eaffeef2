//! The operation sum type.

use std::fmt;

use serde::{Deserialize, Serialize};

use cascade_core::{
    AttributeId, CollectionId, CorrelationId, DataDocument, Document, LinkInstance, LinkTypeId,
    TemplateId, Value,
};

use crate::reference::{DocumentRef, LinkRef};
use crate::request::SideEffectRequest;

/// Create a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCreate {
    /// Provisional id other operations of the batch use to reference it.
    pub correlation_id: Option<CorrelationId>,
    pub collection_id: CollectionId,
    /// Raw (client form) initial data.
    pub data: DataDocument,
    pub parent: Option<DocumentRef>,
}

impl DocumentCreate {
    pub fn new(collection_id: impl Into<CollectionId>, data: DataDocument) -> Self {
        Self {
            correlation_id: None,
            collection_id: collection_id.into(),
            data,
            parent: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<CorrelationId>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_parent(mut self, parent: DocumentRef) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Set one attribute of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentUpdate {
    pub target: DocumentRef,
    pub collection_id: CollectionId,
    pub attribute_id: AttributeId,
    /// Raw (client form) value.
    pub value: Value,
    /// The document as it was before the edit that fired the automation.
    pub original: Option<Document>,
}

impl DocumentUpdate {
    pub fn new(
        target: DocumentRef,
        collection_id: impl Into<CollectionId>,
        attribute_id: impl Into<AttributeId>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            target,
            collection_id: collection_id.into(),
            attribute_id: attribute_id.into(),
            value: value.into(),
            original: None,
        }
    }

    pub fn with_original(mut self, original: Document) -> Self {
        self.original = Some(original);
        self
    }
}

/// Delete a document together with every link referencing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRemove {
    pub target: DocumentRef,
    pub collection_id: CollectionId,
}

impl DocumentRemove {
    pub fn new(target: DocumentRef, collection_id: impl Into<CollectionId>) -> Self {
        Self {
            target,
            collection_id: collection_id.into(),
        }
    }
}

/// Create a link between two documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkCreate {
    /// Provisional id other operations of the batch use to reference it.
    pub template_id: Option<TemplateId>,
    pub link_type_id: LinkTypeId,
    pub documents: [DocumentRef; 2],
    pub data: DataDocument,
}

impl LinkCreate {
    pub fn new(
        link_type_id: impl Into<LinkTypeId>,
        documents: [DocumentRef; 2],
        data: DataDocument,
    ) -> Self {
        Self {
            template_id: None,
            link_type_id: link_type_id.into(),
            documents,
            data,
        }
    }

    pub fn with_template_id(mut self, template_id: impl Into<TemplateId>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }
}

/// Set one attribute of a link instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkUpdate {
    pub target: LinkRef,
    pub link_type_id: LinkTypeId,
    pub attribute_id: AttributeId,
    pub value: Value,
    pub original: Option<LinkInstance>,
}

impl LinkUpdate {
    pub fn new(
        target: LinkRef,
        link_type_id: impl Into<LinkTypeId>,
        attribute_id: impl Into<AttributeId>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            target,
            link_type_id: link_type_id.into(),
            attribute_id: attribute_id.into(),
            value: value.into(),
            original: None,
        }
    }

    pub fn with_original(mut self, original: LinkInstance) -> Self {
        self.original = Some(original);
        self
    }
}

/// Delete a link instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRemove {
    pub target: LinkRef,
    pub link_type_id: LinkTypeId,
}

impl LinkRemove {
    pub fn new(target: LinkRef, link_type_id: impl Into<LinkTypeId>) -> Self {
        Self {
            target,
            link_type_id: link_type_id.into(),
        }
    }
}

/// One mutation or side-effect request produced by an automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "payload", rename_all = "snake_case")]
pub enum Operation {
    DocumentCreate(DocumentCreate),
    DocumentUpdate(DocumentUpdate),
    DocumentRemove(DocumentRemove),
    LinkCreate(LinkCreate),
    LinkUpdate(LinkUpdate),
    LinkRemove(LinkRemove),
    SideEffect(SideEffectRequest),
}

impl Operation {
    /// Why the operation cannot be applied, if it is incomplete.
    pub fn incompleteness(&self) -> Option<&'static str> {
        match self {
            Operation::DocumentCreate(op) => {
                if op.collection_id.is_empty() {
                    Some("missing collection")
                } else if op.correlation_id.as_ref().is_some_and(|c| c.is_empty()) {
                    Some("empty correlation id")
                } else if op.parent.as_ref().is_some_and(|p| p.is_empty()) {
                    Some("empty parent reference")
                } else {
                    None
                }
            }
            Operation::DocumentUpdate(op) => {
                if op.target.is_empty() {
                    Some("missing document")
                } else if op.collection_id.is_empty() {
                    Some("missing collection")
                } else if op.attribute_id.is_empty() {
                    Some("missing attribute")
                } else {
                    None
                }
            }
            Operation::DocumentRemove(op) => {
                if op.target.is_empty() {
                    Some("missing document")
                } else if op.collection_id.is_empty() {
                    Some("missing collection")
                } else {
                    None
                }
            }
            Operation::LinkCreate(op) => {
                if op.link_type_id.is_empty() {
                    Some("missing link type")
                } else if op.documents.iter().any(|d| d.is_empty()) {
                    Some("missing linked document")
                } else if op.template_id.as_ref().is_some_and(|t| t.is_empty()) {
                    Some("empty template id")
                } else {
                    None
                }
            }
            Operation::LinkUpdate(op) => {
                if op.target.is_empty() {
                    Some("missing link")
                } else if op.link_type_id.is_empty() {
                    Some("missing link type")
                } else if op.attribute_id.is_empty() {
                    Some("missing attribute")
                } else {
                    None
                }
            }
            Operation::LinkRemove(op) => {
                if op.target.is_empty() {
                    Some("missing link")
                } else if op.link_type_id.is_empty() {
                    Some("missing link type")
                } else {
                    None
                }
            }
            Operation::SideEffect(request) => request.incompleteness(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.incompleteness().is_none()
    }

    /// Short kind name used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::DocumentCreate(_) => "DocumentCreate",
            Operation::DocumentUpdate(_) => "DocumentUpdate",
            Operation::DocumentRemove(_) => "DocumentRemove",
            Operation::LinkCreate(_) => "LinkCreate",
            Operation::LinkUpdate(_) => "LinkUpdate",
            Operation::LinkRemove(_) => "LinkRemove",
            Operation::SideEffect(_) => "SideEffect",
        }
    }

    /// Collection of a document operation.
    pub fn collection_id(&self) -> Option<&CollectionId> {
        match self {
            Operation::DocumentCreate(op) => Some(&op.collection_id),
            Operation::DocumentUpdate(op) => Some(&op.collection_id),
            Operation::DocumentRemove(op) => Some(&op.collection_id),
            _ => None,
        }
    }

    /// Link type of a link operation.
    pub fn link_type_id(&self) -> Option<&LinkTypeId> {
        match self {
            Operation::LinkCreate(op) => Some(&op.link_type_id),
            Operation::LinkUpdate(op) => Some(&op.link_type_id),
            Operation::LinkRemove(op) => Some(&op.link_type_id),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::DocumentCreate(op) => write!(
                f,
                "DocumentCreate(collection={}, correlation={})",
                op.collection_id,
                op.correlation_id.as_ref().map_or("-", |c| c.as_str())
            ),
            Operation::DocumentUpdate(op) => write!(
                f,
                "DocumentUpdate(document={}, collection={}, attribute={})",
                op.target, op.collection_id, op.attribute_id
            ),
            Operation::DocumentRemove(op) => write!(
                f,
                "DocumentRemove(document={}, collection={})",
                op.target, op.collection_id
            ),
            Operation::LinkCreate(op) => write!(
                f,
                "LinkCreate(link_type={}, documents=[{}, {}], template={})",
                op.link_type_id,
                op.documents[0],
                op.documents[1],
                op.template_id.as_ref().map_or("-", |t| t.as_str())
            ),
            Operation::LinkUpdate(op) => write!(
                f,
                "LinkUpdate(link={}, link_type={}, attribute={})",
                op.target, op.link_type_id, op.attribute_id
            ),
            Operation::LinkRemove(op) => write!(
                f,
                "LinkRemove(link={}, link_type={})",
                op.target, op.link_type_id
            ),
            Operation::SideEffect(request) => write!(f, "SideEffect({:?})", request),
        }
    }
}

impl From<DocumentCreate> for Operation {
    fn from(op: DocumentCreate) -> Self {
        Operation::DocumentCreate(op)
    }
}

impl From<DocumentUpdate> for Operation {
    fn from(op: DocumentUpdate) -> Self {
        Operation::DocumentUpdate(op)
    }
}

impl From<DocumentRemove> for Operation {
    fn from(op: DocumentRemove) -> Self {
        Operation::DocumentRemove(op)
    }
}

impl From<LinkCreate> for Operation {
    fn from(op: LinkCreate) -> Self {
        Operation::LinkCreate(op)
    }
}

impl From<LinkUpdate> for Operation {
    fn from(op: LinkUpdate) -> Self {
        Operation::LinkUpdate(op)
    }
}

impl From<LinkRemove> for Operation {
    fn from(op: LinkRemove) -> Self {
        Operation::LinkRemove(op)
    }
}

impl From<SideEffectRequest> for Operation {
    fn from(request: SideEffectRequest) -> Self {
        Operation::SideEffect(request)
    }
}
