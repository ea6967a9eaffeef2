//! In-memory store implementation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use cascade_core::{
    apply_patch, Collection, CollectionId, DataDocument, Document, DocumentDraft, DocumentId,
    LinkDraft, LinkId, LinkInstance, LinkType, LinkTypeId,
};
use indexmap::IndexMap;

use crate::contract::{RecordStore, SchemaStore};
use crate::error::{StoreError, StoreResult};
use crate::index::LinkIndex;

/// ID allocator for documents and links.
#[derive(Debug)]
struct IdAllocator {
    next_document_id: u64,
    next_link_id: u64,
}

impl IdAllocator {
    fn new() -> Self {
        Self {
            next_document_id: 1,
            next_link_id: 1,
        }
    }

    fn alloc_document_id(&mut self) -> DocumentId {
        let id = DocumentId::new(format!("d{}", self.next_document_id));
        self.next_document_id += 1;
        id
    }

    fn alloc_link_id(&mut self) -> LinkId {
        let id = LinkId::new(format!("l{}", self.next_link_id));
        self.next_link_id += 1;
        id
    }
}

/// Counters of mutating store calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub documents_created: usize,
    pub documents_deleted: usize,
    pub data_patches: usize,
    pub document_updates: usize,
    pub links_created: usize,
    pub links_deleted: usize,
    pub link_data_patches: usize,
    pub link_updates: usize,
    pub collection_updates: usize,
    pub link_type_updates: usize,
    /// Write-backs that asked for a user-facing push notification.
    pub push_notifications: usize,
}

#[derive(Debug)]
struct MemoryState {
    /// Document records; data lives in `data`.
    documents: IndexMap<DocumentId, Document>,
    data: HashMap<DocumentId, DataDocument>,
    links: IndexMap<LinkId, LinkInstance>,
    link_data: HashMap<LinkId, DataDocument>,
    collections: IndexMap<CollectionId, Collection>,
    link_types: IndexMap<LinkTypeId, LinkType>,
    link_index: LinkIndex,
    id_alloc: IdAllocator,
    stats: StoreStats,
}

impl MemoryState {
    fn new() -> Self {
        Self {
            documents: IndexMap::new(),
            data: HashMap::new(),
            links: IndexMap::new(),
            link_data: HashMap::new(),
            collections: IndexMap::new(),
            link_types: IndexMap::new(),
            link_index: LinkIndex::new(),
            id_alloc: IdAllocator::new(),
            stats: StoreStats::default(),
        }
    }

    fn document_with_data(&self, id: &DocumentId) -> Option<Document> {
        let record = self.documents.get(id)?;
        let data = self.data.get(id).cloned().unwrap_or_default();
        Some(record.with_data(data))
    }

    fn link_with_data(&self, id: &LinkId) -> Option<LinkInstance> {
        let record = self.links.get(id)?;
        let data = self.link_data.get(id).cloned().unwrap_or_default();
        Some(record.with_data(data))
    }

    fn insert_document(&mut self, draft: DocumentDraft) -> Document {
        let id = self.id_alloc.alloc_document_id();
        let document = draft.into_document(id.clone());
        self.data.insert(id.clone(), document.data.clone());
        self.documents
            .insert(id, document.with_data(DataDocument::new()));
        document
    }

    fn insert_link(&mut self, draft: LinkDraft) -> LinkInstance {
        let id = self.id_alloc.alloc_link_id();
        let link = draft.into_link(id.clone());
        self.link_index
            .insert(&id, &link.link_type_id, &link.document_ids);
        self.link_data.insert(id.clone(), link.data.clone());
        self.links.insert(id, link.with_data(DataDocument::new()));
        link
    }

    fn remove_link(&mut self, id: &LinkId) -> Option<LinkInstance> {
        let link = self.links.shift_remove(id)?;
        self.link_data.remove(id);
        self.link_index
            .remove(id, &link.link_type_id, &link.document_ids);
        Some(link)
    }

    fn with_documents_count(&self, collection: &Collection) -> Collection {
        let mut collection = collection.clone();
        collection.documents_count = self
            .documents
            .values()
            .filter(|d| d.collection_id == collection.id)
            .count() as u64;
        collection
    }

    fn with_links_count(&self, link_type: &LinkType) -> LinkType {
        let mut link_type = link_type.clone();
        link_type.links_count = self.link_index.count_of_type(&link_type.id) as u64;
        link_type
    }
}

/// The in-memory store.
///
/// All state sits behind one lock, so every call is atomic with respect to
/// concurrent callers.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::new()),
        }
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }

    // ==================== Seeding ====================

    /// Register a collection.
    pub fn add_collection(&self, collection: Collection) -> StoreResult<()> {
        let mut state = self.state()?;
        state.collections.insert(collection.id.clone(), collection);
        Ok(())
    }

    /// Register a link type.
    pub fn add_link_type(&self, link_type: LinkType) -> StoreResult<()> {
        let mut state = self.state()?;
        state.link_types.insert(link_type.id.clone(), link_type);
        Ok(())
    }

    /// Insert a document without counting it as a committer write.
    pub fn seed_document(&self, draft: DocumentDraft) -> StoreResult<Document> {
        let mut state = self.state()?;
        Ok(state.insert_document(draft))
    }

    /// Insert a link without counting it as a committer write.
    pub fn seed_link(&self, draft: LinkDraft) -> StoreResult<LinkInstance> {
        let mut state = self.state()?;
        for document_id in &draft.document_ids {
            if !state.documents.contains_key(document_id) {
                return Err(StoreError::DocumentNotFound(document_id.clone()));
            }
        }
        Ok(state.insert_link(draft))
    }

    // ==================== Inspection ====================

    /// Snapshot of the write counters.
    pub fn stats(&self) -> StoreResult<StoreStats> {
        Ok(self.state()?.stats.clone())
    }

    pub fn document(&self, id: &DocumentId) -> StoreResult<Option<Document>> {
        Ok(self.state()?.document_with_data(id))
    }

    pub fn link(&self, id: &LinkId) -> StoreResult<Option<LinkInstance>> {
        Ok(self.state()?.link_with_data(id))
    }

    pub fn collection(&self, id: &CollectionId) -> StoreResult<Option<Collection>> {
        let state = self.state()?;
        Ok(state
            .collections
            .get(id)
            .map(|c| state.with_documents_count(c)))
    }

    pub fn link_type(&self, id: &LinkTypeId) -> StoreResult<Option<LinkType>> {
        let state = self.state()?;
        Ok(state.link_types.get(id).map(|l| state.with_links_count(l)))
    }
}

impl RecordStore for MemoryStore {
    fn create_documents(&self, drafts: Vec<DocumentDraft>) -> StoreResult<Vec<Document>> {
        let mut state = self.state()?;
        let created: Vec<Document> = drafts
            .into_iter()
            .map(|draft| state.insert_document(draft))
            .collect();
        state.stats.documents_created += created.len();
        Ok(created)
    }

    fn documents_by_ids(&self, ids: &[DocumentId]) -> StoreResult<Vec<Document>> {
        let state = self.state()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.document_with_data(id))
            .collect())
    }

    fn get_data(&self, _collection_id: &CollectionId, id: &DocumentId) -> StoreResult<DataDocument> {
        let state = self.state()?;
        if !state.documents.contains_key(id) {
            return Err(StoreError::DocumentNotFound(id.clone()));
        }
        Ok(state.data.get(id).cloned().unwrap_or_default())
    }

    fn patch_data(
        &self,
        _collection_id: &CollectionId,
        id: &DocumentId,
        patch: &DataDocument,
    ) -> StoreResult<DataDocument> {
        let mut state = self.state()?;
        if !state.documents.contains_key(id) {
            return Err(StoreError::DocumentNotFound(id.clone()));
        }
        let data = state.data.entry(id.clone()).or_default();
        apply_patch(data, patch);
        let patched = data.clone();
        state.stats.data_patches += 1;
        Ok(patched)
    }

    fn update_document(&self, document: &Document) -> StoreResult<Document> {
        let mut state = self.state()?;
        let record = state
            .documents
            .get_mut(&document.id)
            .ok_or_else(|| StoreError::DocumentNotFound(document.id.clone()))?;
        record.updated_by = document.updated_by.clone();
        record.update_date = document.update_date;
        record.parent_id = document.parent_id.clone();
        let updated = record.clone();
        state.stats.document_updates += 1;
        let data = state.data.get(&document.id).cloned().unwrap_or_default();
        Ok(updated.with_data(data))
    }

    fn delete_document(&self, id: &DocumentId) -> StoreResult<()> {
        let mut state = self.state()?;
        state
            .documents
            .shift_remove(id)
            .ok_or_else(|| StoreError::DocumentNotFound(id.clone()))?;
        state.stats.documents_deleted += 1;
        Ok(())
    }

    fn delete_data(&self, _collection_id: &CollectionId, id: &DocumentId) -> StoreResult<()> {
        let mut state = self.state()?;
        state.data.remove(id);
        Ok(())
    }

    fn create_links(&self, drafts: Vec<LinkDraft>) -> StoreResult<Vec<LinkInstance>> {
        let mut state = self.state()?;
        for draft in &drafts {
            for document_id in &draft.document_ids {
                if !state.documents.contains_key(document_id) {
                    return Err(StoreError::DocumentNotFound(document_id.clone()));
                }
            }
        }
        let created: Vec<LinkInstance> = drafts
            .into_iter()
            .map(|draft| state.insert_link(draft))
            .collect();
        state.stats.links_created += created.len();
        Ok(created)
    }

    fn links_by_ids(&self, ids: &[LinkId]) -> StoreResult<Vec<LinkInstance>> {
        let state = self.state()?;
        Ok(ids.iter().filter_map(|id| state.link_with_data(id)).collect())
    }

    fn links_by_document_ids(&self, ids: &[DocumentId]) -> StoreResult<Vec<LinkInstance>> {
        let state = self.state()?;
        let mut link_ids: Vec<LinkId> = Vec::new();
        for document_id in ids {
            for link_id in state.link_index.links_of_document(document_id) {
                if !link_ids.contains(link_id) {
                    link_ids.push(link_id.clone());
                }
            }
        }
        Ok(link_ids
            .iter()
            .filter_map(|id| state.link_with_data(id))
            .collect())
    }

    fn delete_links_by_document_ids(&self, ids: &[DocumentId]) -> StoreResult<usize> {
        let mut state = self.state()?;
        let link_ids: Vec<LinkId> = ids
            .iter()
            .flat_map(|id| state.link_index.links_of_document(id).cloned().collect::<Vec<_>>())
            .collect();
        let mut deleted = 0;
        for link_id in link_ids {
            if state.remove_link(&link_id).is_some() {
                deleted += 1;
            }
        }
        state.stats.links_deleted += deleted;
        Ok(deleted)
    }

    fn delete_link(&self, id: &LinkId) -> StoreResult<()> {
        let mut state = self.state()?;
        state
            .remove_link(id)
            .ok_or_else(|| StoreError::LinkNotFound(id.clone()))?;
        state.stats.links_deleted += 1;
        Ok(())
    }

    fn get_link_data(&self, _link_type_id: &LinkTypeId, id: &LinkId) -> StoreResult<DataDocument> {
        let state = self.state()?;
        if !state.links.contains_key(id) {
            return Err(StoreError::LinkNotFound(id.clone()));
        }
        Ok(state.link_data.get(id).cloned().unwrap_or_default())
    }

    fn patch_link_data(
        &self,
        _link_type_id: &LinkTypeId,
        id: &LinkId,
        patch: &DataDocument,
    ) -> StoreResult<DataDocument> {
        let mut state = self.state()?;
        if !state.links.contains_key(id) {
            return Err(StoreError::LinkNotFound(id.clone()));
        }
        let data = state.link_data.entry(id.clone()).or_default();
        apply_patch(data, patch);
        let patched = data.clone();
        state.stats.link_data_patches += 1;
        Ok(patched)
    }

    fn update_link(&self, link: &LinkInstance) -> StoreResult<LinkInstance> {
        let mut state = self.state()?;
        let record = state
            .links
            .get_mut(&link.id)
            .ok_or_else(|| StoreError::LinkNotFound(link.id.clone()))?;
        record.updated_by = link.updated_by.clone();
        record.update_date = link.update_date;
        let updated = record.clone();
        state.stats.link_updates += 1;
        let data = state.link_data.get(&link.id).cloned().unwrap_or_default();
        Ok(updated.with_data(data))
    }
}

impl SchemaStore for MemoryStore {
    fn collections_by_ids(&self, ids: &[CollectionId]) -> StoreResult<Vec<Collection>> {
        let state = self.state()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.collections.get(id))
            .map(|c| state.with_documents_count(c))
            .collect())
    }

    fn update_collection(
        &self,
        collection: &Collection,
        push_notification: bool,
    ) -> StoreResult<Collection> {
        let mut state = self.state()?;
        if !state.collections.contains_key(&collection.id) {
            return Err(StoreError::CollectionNotFound(collection.id.clone()));
        }
        state
            .collections
            .insert(collection.id.clone(), collection.clone());
        state.stats.collection_updates += 1;
        if push_notification {
            state.stats.push_notifications += 1;
        }
        Ok(state.with_documents_count(collection))
    }

    fn link_types_by_ids(&self, ids: &[LinkTypeId]) -> StoreResult<Vec<LinkType>> {
        let state = self.state()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.link_types.get(id))
            .map(|l| state.with_links_count(l))
            .collect())
    }

    fn update_link_type(
        &self,
        link_type: &LinkType,
        push_notification: bool,
    ) -> StoreResult<LinkType> {
        let mut state = self.state()?;
        if !state.link_types.contains_key(&link_type.id) {
            return Err(StoreError::LinkTypeNotFound(link_type.id.clone()));
        }
        state
            .link_types
            .insert(link_type.id.clone(), link_type.clone());
        state.stats.link_type_updates += 1;
        if push_notification {
            state.stats.push_notifications += 1;
        }
        Ok(state.with_links_count(link_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::{data, Attribute};
    use pretty_assertions::assert_eq;

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .add_collection(Collection::new("c1", "Tasks").with_attribute(Attribute::new("a1", "Title")))
            .unwrap();
        store
            .add_link_type(LinkType::new("lt1", "depends", ["c1".into(), "c1".into()]))
            .unwrap();
        store
    }

    #[test]
    fn test_create_documents_assigns_sequential_ids() {
        // GIVEN
        let store = seeded_store();
        let drafts = vec![
            DocumentDraft::new("c1".into(), data! { "a1" => "one" }),
            DocumentDraft::new("c1".into(), data! { "a1" => "two" }),
        ];

        // WHEN
        let created = store.create_documents(drafts).unwrap();

        // THEN
        let ids: Vec<_> = created.iter().map(|d| d.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["d1", "d2"]);
        assert_eq!(store.stats().unwrap().documents_created, 2);
        assert_eq!(store.collection(&"c1".into()).unwrap().unwrap().documents_count, 2);
    }

    #[test]
    fn test_patch_data_merges() {
        // GIVEN
        let store = seeded_store();
        let doc = store
            .seed_document(DocumentDraft::new("c1".into(), data! { "a1" => "x", "a2" => 1 }))
            .unwrap();

        // WHEN
        let patched = store
            .patch_data(&doc.collection_id, &doc.id, &data! { "a2" => 2 })
            .unwrap();

        // THEN
        assert_eq!(patched, data! { "a1" => "x", "a2" => 2 });
        assert_eq!(store.get_data(&doc.collection_id, &doc.id).unwrap(), patched);
        assert_eq!(store.stats().unwrap().data_patches, 1);
    }

    #[test]
    fn test_patch_missing_document_fails() {
        let store = seeded_store();

        let result = store.patch_data(&"c1".into(), &"d404".into(), &data! { "a1" => 1 });

        assert!(matches!(result, Err(StoreError::DocumentNotFound(_))));
    }

    #[test]
    fn test_delete_links_by_document_ids() {
        // GIVEN
        let store = seeded_store();
        let d1 = store.seed_document(DocumentDraft::new("c1".into(), data!())).unwrap();
        let d2 = store.seed_document(DocumentDraft::new("c1".into(), data!())).unwrap();
        let d3 = store.seed_document(DocumentDraft::new("c1".into(), data!())).unwrap();
        store
            .seed_link(LinkDraft::new("lt1".into(), [d1.id.clone(), d2.id.clone()], data!()))
            .unwrap();
        store
            .seed_link(LinkDraft::new("lt1".into(), [d2.id.clone(), d3.id.clone()], data!()))
            .unwrap();

        // WHEN
        let found = store.links_by_document_ids(&[d2.id.clone()]).unwrap();
        let deleted = store.delete_links_by_document_ids(&[d2.id.clone()]).unwrap();

        // THEN
        assert_eq!(found.len(), 2);
        assert_eq!(deleted, 2);
        assert_eq!(store.link_type(&"lt1".into()).unwrap().unwrap().links_count, 0);
    }

    #[test]
    fn test_create_link_requires_existing_documents() {
        let store = seeded_store();

        let result = store.create_links(vec![LinkDraft::new(
            "lt1".into(),
            ["d1".into(), "d2".into()],
            data!(),
        )]);

        assert!(matches!(result, Err(StoreError::DocumentNotFound(_))));
    }

    #[test]
    fn test_update_collection_counts_push_notifications() {
        // GIVEN
        let store = seeded_store();
        let mut collection = store.collection(&"c1".into()).unwrap().unwrap();
        collection.attributes[0].usage_count = 3;

        // WHEN
        store.update_collection(&collection, false).unwrap();

        // THEN
        let stats = store.stats().unwrap();
        assert_eq!(stats.collection_updates, 1);
        assert_eq!(stats.push_notifications, 0);
        let stored = store.collection(&"c1".into()).unwrap().unwrap();
        assert_eq!(stored.attributes[0].usage_count, 3);
    }
}
