//! Audit entry types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cascade_core::{DataDocument, UserId};

/// Sequence number - position of a record in the audit log.
pub type Sequence = u64;

/// Kind of audited resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Document,
    Link,
}

/// The audited resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditTarget {
    pub resource_type: ResourceType,
    /// Owning collection id for documents, link type id for links.
    pub parent_id: String,
    pub resource_id: String,
}

impl AuditTarget {
    pub fn document(collection_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            resource_type: ResourceType::Document,
            parent_id: collection_id.into(),
            resource_id: document_id.into(),
        }
    }

    pub fn link(link_type_id: impl Into<String>, link_id: impl Into<String>) -> Self {
        Self {
            resource_type: ResourceType::Link,
            parent_id: link_type_id.into(),
            resource_id: link_id.into(),
        }
    }
}

/// Who made a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditActor {
    pub initiator: UserId,
    /// Display name of the automation that produced the change.
    pub automation: String,
}

impl AuditActor {
    pub fn new(initiator: UserId, automation: impl Into<String>) -> Self {
        Self {
            initiator,
            automation: automation.into(),
        }
    }
}

/// Before/after payloads of a data change, in stored and client form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataChange {
    pub before: DataDocument,
    pub after: DataDocument,
    pub before_decoded: DataDocument,
    pub after_decoded: DataDocument,
}

/// Audit entry types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEntry {
    /// A resource was created with the given stored data.
    Create {
        target: AuditTarget,
        actor: AuditActor,
        data: DataDocument,
    },

    /// A resource's data was patched.
    DataChange {
        target: AuditTarget,
        actor: AuditActor,
        change: DataChange,
    },

    /// A resource was deleted; `data` is its last decoded state.
    Delete {
        target: AuditTarget,
        actor: AuditActor,
        data: DataDocument,
    },
}

impl AuditEntry {
    pub fn target(&self) -> &AuditTarget {
        match self {
            AuditEntry::Create { target, .. }
            | AuditEntry::DataChange { target, .. }
            | AuditEntry::Delete { target, .. } => target,
        }
    }

    pub fn actor(&self) -> &AuditActor {
        match self {
            AuditEntry::Create { actor, .. }
            | AuditEntry::DataChange { actor, .. }
            | AuditEntry::Delete { actor, .. } => actor,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, AuditEntry::Create { .. })
    }

    pub fn is_data_change(&self) -> bool {
        matches!(self, AuditEntry::DataChange { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, AuditEntry::Delete { .. })
    }
}

/// An audit entry with its sequence number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub sequence: Sequence,
    pub recorded_at: DateTime<Utc>,
    pub entry: AuditEntry,
}
