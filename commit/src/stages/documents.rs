//! Document stages: create, update, remove.

use std::collections::BTreeSet;
use std::slice;

use tracing::{debug, warn};

use cascade_core::{
    introduced_keys, AttributeId, CollectionId, DataDocument, DocumentDraft, DocumentId, LinkTypeId,
};
use cascade_journal::{AuditTarget, DataChange};
use cascade_operation::{group_by_key, DocumentCreate, DocumentRef, DocumentRemove, DocumentUpdate};
use cascade_rule::{plan_retrigger, EntityVersions, FollowUpTask, Retrigger, UpdateDocumentEvent};

use crate::committer::CommitRun;
use crate::error::StageFailure;

impl CommitRun<'_, '_> {
    pub(crate) fn create_documents(
        &mut self,
        creates: Vec<DocumentCreate>,
    ) -> Result<(), StageFailure> {
        if creates.is_empty() {
            return Ok(());
        }
        let store = self.store();

        let mut drafts = Vec::with_capacity(creates.len());
        let mut pending_parents: Vec<Option<DocumentRef>> = Vec::with_capacity(creates.len());
        for create in creates {
            let collection = self.schema.collection(store, &create.collection_id)?;
            let mut draft = DocumentDraft::new(
                create.collection_id,
                self.codec().encode(&collection.attributes, &create.data),
            );
            draft.created_by = Some(self.task.initiator.clone());
            draft.creation_date = Some(self.now);
            draft.correlation_id = create.correlation_id;
            let pending_parent = match create.parent {
                Some(DocumentRef::Existing(parent)) => {
                    draft.parent_id = Some(parent);
                    None
                }
                pending => pending,
            };
            pending_parents.push(pending_parent);
            drafts.push(draft);
        }

        let mut created = store.create_documents(drafts)?;
        self.resolver.register_documents(&created);

        // Parents created in the same bulk insert only have ids now.
        for (document, parent) in created.iter_mut().zip(pending_parents) {
            if let Some(parent) = parent {
                document.parent_id = Some(self.resolver.document_id(&parent));
                store.update_document(document)?;
            }
        }

        let count = created.len();
        let mut collection_ids: Vec<CollectionId> = Vec::new();
        for document in created {
            let collection = self.schema.collection(store, &document.collection_id)?;
            self.audit_create(
                AuditTarget::document(document.collection_id.as_str(), document.id.as_str()),
                &document.data,
            );
            let decoded = self.codec().decode(&collection.attributes, &document.data);
            self.tracker.add_created_document(document.with_data(decoded));
            if !collection_ids.contains(&document.collection_id) {
                collection_ids.push(document.collection_id.clone());
            }
            self.pending_documents.insert(document.id.clone(), document);
        }

        for collection in store.collections_by_ids(&collection_ids)? {
            self.tracker.track_collection(collection);
        }
        debug!("created {count} documents");
        Ok(())
    }

    pub(crate) fn update_documents(
        &mut self,
        updates: Vec<DocumentUpdate>,
    ) -> Result<(), StageFailure> {
        if updates.is_empty() {
            return Ok(());
        }
        let resolver = &self.resolver;
        let groups = group_by_key(updates, |update| resolver.document_id(&update.target));
        let mut committed = 0;
        for (id, group) in groups {
            if self.update_document(&id, group)? {
                committed += 1;
            }
        }
        debug!("committed updates of {committed} documents");
        Ok(())
    }

    /// Apply every update of one document as a single patch. Returns false
    /// when the document no longer exists.
    fn update_document(
        &mut self,
        id: &DocumentId,
        group: Vec<DocumentUpdate>,
    ) -> Result<bool, StageFailure> {
        let store = self.store();
        let Some(document) = store.documents_by_ids(slice::from_ref(id))?.into_iter().next()
        else {
            debug!("skipping update of missing document {id}");
            return Ok(false);
        };
        let collection = self.schema.collection(store, &document.collection_id)?;

        let original = self
            .task
            .origin_document()
            .filter(|origin| &origin.id == id)
            .cloned()
            .or_else(|| group.iter().find_map(|update| update.original.clone()));

        // Later updates of the same attribute win.
        let mut aggregated = DataDocument::new();
        let mut changed_attributes: BTreeSet<AttributeId> = BTreeSet::new();
        for update in group {
            aggregated.insert(update.attribute_id.to_string(), update.value);
            changed_attributes.insert(update.attribute_id);
        }
        let patch = self.codec().encode(&collection.attributes, &aggregated);

        let before_patch = store.get_data(&document.collection_id, id)?;
        let introduced = introduced_keys(&patch, &before_patch);
        self.counters.introduce_in_collection(&collection, &introduced);

        let patched = store.patch_data(&document.collection_id, id, &patch)?;
        let mut metadata = document.clone();
        metadata.updated_by = Some(self.task.initiator.clone());
        metadata.update_date = Some(self.now);
        let updated = store.update_document(&metadata)?.with_data(patched.clone());

        let versions = EntityVersions::new(original, document.with_data(before_patch), updated);

        if collection.is_task_list() {
            let event = UpdateDocumentEvent {
                before: versions.deferred_before().clone(),
                after: versions.computed.clone(),
            };
            if let Err(err) = self.committer.purpose.process_changes(&event, &collection) {
                warn!("purpose change processing failed for document {id}: {err}");
            }
        }

        let before_decoded = self
            .codec()
            .decode(&collection.attributes, &versions.user_edited.data);
        let after_decoded = self.codec().decode(&collection.attributes, &patched);
        self.audit_data_change(
            AuditTarget::document(collection.id.as_str(), id.as_str()),
            DataChange {
                before: versions.user_edited.data.clone(),
                after: patched,
                before_decoded,
                after_decoded: after_decoded.clone(),
            },
        );

        let created = self.tracker.is_created_document(id);
        match plan_retrigger(self.task, created) {
            Retrigger::Created => {
                self.pending_documents
                    .insert(id.clone(), versions.computed.clone());
                self.updated_document_creations.insert(id.clone());
            }
            Retrigger::Synchronous => {
                let event = UpdateDocumentEvent {
                    before: versions.inline_before().clone(),
                    after: versions.computed.clone(),
                };
                let rule_name = self.task.rule_name().unwrap_or_default();
                self.committer
                    .dispatcher
                    .on_update_document(&event, rule_name)?;
            }
            Retrigger::Deferred => {
                let event = UpdateDocumentEvent {
                    before: versions.deferred_before().clone(),
                    after: versions.computed.clone(),
                };
                let follow_up = FollowUpTask::for_document(self.task, event, changed_attributes);
                if let Err(err) = self.committer.scheduler.submit(follow_up) {
                    warn!("failed to schedule follow-up for document {id}: {err}");
                }
            }
            Retrigger::None => {}
        }

        self.tracker
            .add_updated_document(versions.computed.with_data(after_decoded));
        Ok(true)
    }

    pub(crate) fn remove_documents(
        &mut self,
        removes: Vec<DocumentRemove>,
    ) -> Result<(), StageFailure> {
        if removes.is_empty() {
            return Ok(());
        }
        let resolver = &self.resolver;
        let targets = group_by_key(removes, |remove| resolver.document_id(&remove.target));
        let mut removed = 0;
        for id in targets.keys() {
            if self.remove_document(id)? {
                removed += 1;
            }
        }
        debug!("removed {removed} documents");
        Ok(())
    }

    /// Remove one document after cascading to its links. Returns false when
    /// the document no longer exists.
    fn remove_document(&mut self, id: &DocumentId) -> Result<bool, StageFailure> {
        let store = self.store();
        let Some(document) = store.documents_by_ids(slice::from_ref(id))?.into_iter().next()
        else {
            debug!("skipping removal of missing document {id}");
            return Ok(false);
        };
        let collection = self.schema.collection(store, &document.collection_id)?;

        let links = store.links_by_document_ids(slice::from_ref(id))?;
        store.delete_links_by_document_ids(slice::from_ref(id))?;
        let mut link_type_ids: Vec<LinkTypeId> = Vec::new();
        for link in links {
            let link_type = self.schema.link_type(store, &link.link_type_id)?;
            let decoded = self.codec().decode(&link_type.attributes, &link.data);
            self.audit_delete(
                AuditTarget::link(link.link_type_id.as_str(), link.id.as_str()),
                &decoded,
            );
            if !link_type_ids.contains(&link.link_type_id) {
                link_type_ids.push(link.link_type_id.clone());
            }
            self.pending_links.shift_remove(&link.id);
            self.tracker.add_removed_link(link.with_data(decoded));
        }
        for link_type in store.link_types_by_ids(&link_type_ids)? {
            self.tracker.track_link_type(link_type);
        }

        store.delete_document(id)?;
        store.delete_data(&document.collection_id, id)?;

        let decoded = self.codec().decode(&collection.attributes, &document.data);
        self.audit_delete(
            AuditTarget::document(collection.id.as_str(), id.as_str()),
            &decoded,
        );
        self.pending_documents.shift_remove(id);
        self.tracker.add_removed_document(document.with_data(decoded));

        for collection in store.collections_by_ids(slice::from_ref(&collection.id))? {
            self.tracker.track_collection(collection);
        }
        Ok(true)
    }
}
