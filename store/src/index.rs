//! Indexes for efficient link lookups.

use cascade_core::{DocumentId, LinkId, LinkTypeId};
use indexmap::IndexSet;
use std::collections::HashMap;

/// Link index: DocumentId -> links referencing it, LinkTypeId -> its links.
#[derive(Debug, Default)]
pub struct LinkIndex {
    by_document: HashMap<DocumentId, IndexSet<LinkId>>,
    by_type: HashMap<LinkTypeId, IndexSet<LinkId>>,
}

impl LinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, link_id: &LinkId, link_type_id: &LinkTypeId, documents: &[DocumentId]) {
        for document_id in documents {
            self.by_document
                .entry(document_id.clone())
                .or_default()
                .insert(link_id.clone());
        }
        self.by_type
            .entry(link_type_id.clone())
            .or_default()
            .insert(link_id.clone());
    }

    pub fn remove(&mut self, link_id: &LinkId, link_type_id: &LinkTypeId, documents: &[DocumentId]) {
        for document_id in documents {
            if let Some(set) = self.by_document.get_mut(document_id) {
                set.shift_remove(link_id);
                if set.is_empty() {
                    self.by_document.remove(document_id);
                }
            }
        }
        if let Some(set) = self.by_type.get_mut(link_type_id) {
            set.shift_remove(link_id);
            if set.is_empty() {
                self.by_type.remove(link_type_id);
            }
        }
    }

    /// Links referencing a document, in insertion order.
    pub fn links_of_document(&self, document_id: &DocumentId) -> impl Iterator<Item = &LinkId> + '_ {
        self.by_document
            .get(document_id)
            .into_iter()
            .flat_map(|set| set.iter())
    }

    pub fn count_of_type(&self, link_type_id: &LinkTypeId) -> usize {
        self.by_type.get(link_type_id).map_or(0, |set| set.len())
    }
}
