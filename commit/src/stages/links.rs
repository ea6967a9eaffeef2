//! Link stages: create, remove, update.

use std::collections::BTreeSet;
use std::slice;

use tracing::{debug, warn};

use cascade_core::{introduced_keys, AttributeId, DataDocument, LinkDraft, LinkId, LinkTypeId};
use cascade_journal::{AuditTarget, DataChange};
use cascade_operation::{group_by_key, LinkCreate, LinkRemove, LinkUpdate};
use cascade_rule::{plan_retrigger, EntityVersions, FollowUpTask, Retrigger, UpdateLinkEvent};

use crate::committer::CommitRun;
use crate::error::StageFailure;

impl CommitRun<'_, '_> {
    pub(crate) fn create_links(&mut self, creates: Vec<LinkCreate>) -> Result<(), StageFailure> {
        if creates.is_empty() {
            return Ok(());
        }
        let store = self.store();

        let mut drafts = Vec::with_capacity(creates.len());
        for create in creates {
            let link_type = self.schema.link_type(store, &create.link_type_id)?;
            let [first, second] = &create.documents;
            let document_ids = [
                self.resolver.document_id(first),
                self.resolver.document_id(second),
            ];
            if let Some(removed) = document_ids
                .iter()
                .find(|id| self.tracker.is_removed_document(id))
            {
                debug!(
                    "skipping {} link to document {removed} removed in this batch",
                    create.link_type_id
                );
                continue;
            }
            let mut draft = LinkDraft::new(
                create.link_type_id,
                document_ids,
                self.codec().encode(&link_type.attributes, &create.data),
            );
            draft.created_by = Some(self.task.initiator.clone());
            draft.creation_date = Some(self.now);
            draft.template_id = create.template_id;
            drafts.push(draft);
        }

        if drafts.is_empty() {
            return Ok(());
        }
        let created = store.create_links(drafts)?;
        self.resolver.register_links(&created);

        let count = created.len();
        let mut link_type_ids: Vec<LinkTypeId> = Vec::new();
        for link in created {
            let link_type = self.schema.link_type(store, &link.link_type_id)?;
            self.audit_create(
                AuditTarget::link(link.link_type_id.as_str(), link.id.as_str()),
                &link.data,
            );
            let decoded = self.codec().decode(&link_type.attributes, &link.data);
            self.tracker.add_created_link(link.with_data(decoded));
            if !link_type_ids.contains(&link.link_type_id) {
                link_type_ids.push(link.link_type_id.clone());
            }
            self.pending_links.insert(link.id.clone(), link);
        }

        for link_type in store.link_types_by_ids(&link_type_ids)? {
            self.tracker.track_link_type(link_type);
        }
        debug!("created {count} links");
        Ok(())
    }

    pub(crate) fn remove_links(&mut self, removes: Vec<LinkRemove>) -> Result<(), StageFailure> {
        if removes.is_empty() {
            return Ok(());
        }
        let store = self.store();
        let resolver = &self.resolver;
        let targets = group_by_key(removes, |remove| resolver.link_id(&remove.target));
        let ids: Vec<LinkId> = targets.into_keys().collect();

        let mut link_type_ids: Vec<LinkTypeId> = Vec::new();
        let mut removed = 0;
        for link in store.links_by_ids(&ids)? {
            let link_type = self.schema.link_type(store, &link.link_type_id)?;
            store.delete_link(&link.id)?;
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
            removed += 1;
        }

        for link_type in store.link_types_by_ids(&link_type_ids)? {
            self.tracker.track_link_type(link_type);
        }
        debug!("removed {removed} of {} links", ids.len());
        Ok(())
    }

    pub(crate) fn update_links(&mut self, updates: Vec<LinkUpdate>) -> Result<(), StageFailure> {
        if updates.is_empty() {
            return Ok(());
        }
        let resolver = &self.resolver;
        let groups = group_by_key(updates, |update| resolver.link_id(&update.target));
        let mut committed = 0;
        for (id, group) in groups {
            if self.update_link(&id, group)? {
                committed += 1;
            }
        }
        debug!("committed updates of {committed} links");
        Ok(())
    }

    /// Apply every update of one link as a single patch. Returns false when
    /// the link no longer exists.
    fn update_link(&mut self, id: &LinkId, group: Vec<LinkUpdate>) -> Result<bool, StageFailure> {
        let store = self.store();
        let Some(link) = store.links_by_ids(slice::from_ref(id))?.into_iter().next() else {
            debug!("skipping update of missing link {id}");
            return Ok(false);
        };
        let link_type = self.schema.link_type(store, &link.link_type_id)?;

        let original = self
            .task
            .origin_link()
            .filter(|origin| &origin.id == id)
            .cloned()
            .or_else(|| group.iter().find_map(|update| update.original.clone()));

        let mut aggregated = DataDocument::new();
        let mut changed_attributes: BTreeSet<AttributeId> = BTreeSet::new();
        for update in group {
            aggregated.insert(update.attribute_id.to_string(), update.value);
            changed_attributes.insert(update.attribute_id);
        }
        let patch = self.codec().encode(&link_type.attributes, &aggregated);

        let before_patch = store.get_link_data(&link.link_type_id, id)?;
        let introduced = introduced_keys(&patch, &before_patch);
        self.counters.introduce_in_link_type(&link_type, &introduced);

        let patched = store.patch_link_data(&link.link_type_id, id, &patch)?;
        let mut metadata = link.clone();
        metadata.updated_by = Some(self.task.initiator.clone());
        metadata.update_date = Some(self.now);
        let updated = store.update_link(&metadata)?.with_data(patched.clone());

        let versions = EntityVersions::new(original, link.with_data(before_patch), updated);

        let before_decoded = self
            .codec()
            .decode(&link_type.attributes, &versions.user_edited.data);
        let after_decoded = self.codec().decode(&link_type.attributes, &patched);
        self.audit_data_change(
            AuditTarget::link(link_type.id.as_str(), id.as_str()),
            DataChange {
                before: versions.user_edited.data.clone(),
                after: patched,
                before_decoded,
                after_decoded: after_decoded.clone(),
            },
        );

        match plan_retrigger(self.task, self.tracker.is_created_link(id)) {
            Retrigger::Created => {
                self.pending_links
                    .insert(id.clone(), versions.computed.clone());
                self.updated_link_creations.insert(id.clone());
            }
            Retrigger::Synchronous => {
                let event = UpdateLinkEvent {
                    before: versions.inline_before().clone(),
                    after: versions.computed.clone(),
                };
                let rule_name = self.task.rule_name().unwrap_or_default();
                self.committer.dispatcher.on_update_link(&event, rule_name)?;
            }
            Retrigger::Deferred => {
                let event = UpdateLinkEvent {
                    before: versions.deferred_before().clone(),
                    after: versions.computed.clone(),
                };
                let follow_up = FollowUpTask::for_link(self.task, event, changed_attributes);
                if let Err(err) = self.committer.scheduler.submit(follow_up) {
                    warn!("failed to schedule follow-up for link {id}: {err}");
                }
            }
            Retrigger::None => {}
        }

        self.tracker
            .add_updated_link(versions.computed.with_data(after_decoded));
        Ok(true)
    }
}
