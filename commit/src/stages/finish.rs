//! Final stages: creation events, counter write-back, side effects and
//! propagation.

use std::mem;

use tracing::debug;

use cascade_core::{Document, LinkInstance};
use cascade_operation::SideEffectRequest;

use crate::committer::CommitRun;
use crate::error::StageFailure;

impl CommitRun<'_, '_> {
    /// Report each entity created in this commit exactly once, with its
    /// latest stored data.
    pub(crate) fn dispatch_creations(&mut self) -> Result<(), StageFailure> {
        let documents = mem::take(&mut self.pending_documents);
        for document in documents.values() {
            self.committer.dispatcher.on_create_document(document)?;
        }
        let links = mem::take(&mut self.pending_links);
        for link in links.values() {
            self.committer.dispatcher.on_create_link(link)?;
        }
        Ok(())
    }

    /// Add accumulated usage increments to fresh reads of the affected
    /// collections and link types, then write them back.
    pub(crate) fn write_back_counters(&mut self) -> Result<(), StageFailure> {
        if self.counters.is_empty() {
            return Ok(());
        }
        let store = self.store();
        let push_notification = self.committer.config.push_metadata_changes;

        for mut collection in store.collections_by_ids(&self.counters.collection_ids())? {
            self.counters.apply_to_collection(&mut collection);
            collection.last_time_used = Some(self.now);
            let collection = store.update_collection(&collection, push_notification)?;
            self.tracker.track_collection(collection);
        }
        for mut link_type in store.link_types_by_ids(&self.counters.link_type_ids())? {
            self.counters.apply_to_link_type(&mut link_type);
            let link_type = store.update_link_type(&link_type, push_notification)?;
            self.tracker.track_link_type(link_type);
        }
        Ok(())
    }

    /// Side-effect requests only reach interactive sessions.
    pub(crate) fn collect_side_effects(&mut self, requests: Vec<SideEffectRequest>) {
        if requests.is_empty() {
            return;
        }
        if !self.task.is_interactive() {
            debug!(
                "discarding {} side-effect requests of {}: no interactive session",
                requests.len(),
                self.task.display_name()
            );
            return;
        }
        for request in requests {
            self.tracker.add_side_effect(request);
        }
    }

    /// Hand every updated entity to the dispatcher, including entities created
    /// earlier in this commit. Removed entities are left out.
    pub(crate) fn propagate_changes(&mut self) -> Result<(), StageFailure> {
        let mut documents: Vec<Document> = self.tracker.updated_documents().cloned().collect();
        documents.extend(
            self.updated_document_creations
                .iter()
                .filter_map(|id| self.tracker.created_document(id))
                .cloned(),
        );
        let mut links: Vec<LinkInstance> = self.tracker.updated_links().cloned().collect();
        links.extend(
            self.updated_link_creations
                .iter()
                .filter_map(|id| self.tracker.created_link(id))
                .cloned(),
        );
        self.committer
            .dispatcher
            .propagate_changes(&documents, &links)?;
        Ok(())
    }
}
