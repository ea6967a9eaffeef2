//! Store contracts.
//!
//! Every method is applied atomically per entity. A batch spanning several
//! entities is not transactional: callers see partial application if a call
//! fails midway.

use cascade_core::{
    Collection, CollectionId, DataDocument, Document, DocumentDraft, DocumentId, LinkDraft,
    LinkId, LinkInstance, LinkType, LinkTypeId,
};

use crate::error::StoreResult;

/// Documents, link instances and their attribute data.
pub trait RecordStore {
    /// Persist all drafts in one bulk insert, returning them with real ids.
    fn create_documents(&self, drafts: Vec<DocumentDraft>) -> StoreResult<Vec<Document>>;

    /// Look documents up by id, data included. Unknown ids are skipped.
    fn documents_by_ids(&self, ids: &[DocumentId]) -> StoreResult<Vec<Document>>;

    /// Read the stored data of one document.
    fn get_data(&self, collection_id: &CollectionId, id: &DocumentId) -> StoreResult<DataDocument>;

    /// Merge `patch` into the stored data of one document and return the result.
    fn patch_data(
        &self,
        collection_id: &CollectionId,
        id: &DocumentId,
        patch: &DataDocument,
    ) -> StoreResult<DataDocument>;

    /// Write the document's metadata (updater, update date). Data is untouched.
    fn update_document(&self, document: &Document) -> StoreResult<Document>;

    fn delete_document(&self, id: &DocumentId) -> StoreResult<()>;

    fn delete_data(&self, collection_id: &CollectionId, id: &DocumentId) -> StoreResult<()>;

    /// Persist all drafts in one bulk insert, returning them with real ids.
    fn create_links(&self, drafts: Vec<LinkDraft>) -> StoreResult<Vec<LinkInstance>>;

    /// Look link instances up by id, data included. Unknown ids are skipped.
    fn links_by_ids(&self, ids: &[LinkId]) -> StoreResult<Vec<LinkInstance>>;

    /// All link instances referencing any of the given documents.
    fn links_by_document_ids(&self, ids: &[DocumentId]) -> StoreResult<Vec<LinkInstance>>;

    /// Delete all link instances referencing any of the given documents.
    fn delete_links_by_document_ids(&self, ids: &[DocumentId]) -> StoreResult<usize>;

    fn delete_link(&self, id: &LinkId) -> StoreResult<()>;

    fn get_link_data(&self, link_type_id: &LinkTypeId, id: &LinkId) -> StoreResult<DataDocument>;

    fn patch_link_data(
        &self,
        link_type_id: &LinkTypeId,
        id: &LinkId,
        patch: &DataDocument,
    ) -> StoreResult<DataDocument>;

    /// Write the link's metadata (updater, update date). Data is untouched.
    fn update_link(&self, link: &LinkInstance) -> StoreResult<LinkInstance>;
}

/// Collections and link types.
pub trait SchemaStore {
    /// Look collections up by id with computed counts. Unknown ids are skipped.
    fn collections_by_ids(&self, ids: &[CollectionId]) -> StoreResult<Vec<Collection>>;

    /// Write back attribute definitions and usage bookkeeping.
    /// `push_notification` is false for metadata-only changes made by the committer.
    fn update_collection(
        &self,
        collection: &Collection,
        push_notification: bool,
    ) -> StoreResult<Collection>;

    /// Look link types up by id with computed counts. Unknown ids are skipped.
    fn link_types_by_ids(&self, ids: &[LinkTypeId]) -> StoreResult<Vec<LinkType>>;

    fn update_link_type(&self, link_type: &LinkType, push_notification: bool)
        -> StoreResult<LinkType>;
}

/// The complete store surface used by the committer.
pub trait Store: RecordStore + SchemaStore {}

impl<T: RecordStore + SchemaStore + ?Sized> Store for T {}
