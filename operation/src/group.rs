//! Partitioning a batch by operation kind.

use std::hash::Hash;

use indexmap::IndexMap;

use crate::operation::{
    DocumentCreate, DocumentRemove, DocumentUpdate, LinkCreate, LinkRemove, LinkUpdate, Operation,
};
use crate::request::SideEffectRequest;

/// A batch split by kind, each group in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationGroups {
    pub document_creates: Vec<DocumentCreate>,
    pub document_updates: Vec<DocumentUpdate>,
    pub document_removes: Vec<DocumentRemove>,
    pub link_creates: Vec<LinkCreate>,
    pub link_updates: Vec<LinkUpdate>,
    pub link_removes: Vec<LinkRemove>,
    pub side_effects: Vec<SideEffectRequest>,
}

impl OperationGroups {
    /// Split a batch by kind. Validation is the caller's concern.
    pub fn partition(operations: Vec<Operation>) -> Self {
        let mut groups = Self::default();
        for operation in operations {
            match operation {
                Operation::DocumentCreate(op) => groups.document_creates.push(op),
                Operation::DocumentUpdate(op) => groups.document_updates.push(op),
                Operation::DocumentRemove(op) => groups.document_removes.push(op),
                Operation::LinkCreate(op) => groups.link_creates.push(op),
                Operation::LinkUpdate(op) => groups.link_updates.push(op),
                Operation::LinkRemove(op) => groups.link_removes.push(op),
                Operation::SideEffect(request) => groups.side_effects.push(request),
            }
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.document_creates.len()
            + self.document_updates.len()
            + self.document_removes.len()
            + self.link_creates.len()
            + self.link_updates.len()
            + self.link_removes.len()
            + self.side_effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group items by key, keeping first-appearance order of keys and submission
/// order within each group.
pub fn group_by_key<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> IndexMap<K, Vec<T>>
where
    K: Hash + Eq,
    F: FnMut(&T) -> K,
{
    let mut groups: IndexMap<K, Vec<T>> = IndexMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}
