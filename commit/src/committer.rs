//! Batch committer.
//!
//! Applies one automation's batch of operations in a fixed order:
//!
//! 1. validate (nothing is applied if any operation is incomplete or names
//!    an unknown collection or link type)
//! 2. create documents
//! 3. update documents
//! 4. remove documents, cascading to their links
//! 5. create links
//! 6. remove links
//! 7. update links
//! 8. dispatch creation events
//! 9. write back attribute usage counters
//! 10. collect side-effect requests for interactive sessions
//! 11. propagate decoded updates to the dispatcher
//!
//! Provisional references are resolved through the `CorrelationResolver` as
//! each stage reads its operations. The batch is not transactional: a failing
//! stage leaves earlier stages applied and reports them in the error.

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, warn};

use cascade_constraint::ConstraintCodec;
use cascade_core::{DataDocument, Document, DocumentId, LinkId, LinkInstance};
use cascade_journal::{AuditActor, AuditSink, AuditTarget, DataChange};
use cascade_operation::{validate_batch, Operation, OperationError, OperationGroups};
use cascade_rule::{
    AutomationTask, NoPurposeChanges, PurposeChangeProcessor, TaskScheduler, TriggerDispatcher,
};
use cascade_store::Store;

use crate::config::CommitConfig;
use crate::error::{CommitError, CommitResult, Stage, StageFailure};
use crate::resolver::CorrelationResolver;
use crate::stages::{SchemaSnapshot, UsageCounters};
use crate::tracker::ChangesTracker;

/// Commits operation batches against a store.
pub struct BatchCommitter<'a> {
    pub(crate) store: &'a dyn Store,
    pub(crate) audit: &'a dyn AuditSink,
    pub(crate) codec: &'a dyn ConstraintCodec,
    pub(crate) dispatcher: &'a dyn TriggerDispatcher,
    pub(crate) scheduler: &'a dyn TaskScheduler,
    pub(crate) purpose: &'a dyn PurposeChangeProcessor,
    pub(crate) config: CommitConfig,
}

impl<'a> BatchCommitter<'a> {
    pub fn new(
        store: &'a dyn Store,
        audit: &'a dyn AuditSink,
        codec: &'a dyn ConstraintCodec,
        dispatcher: &'a dyn TriggerDispatcher,
        scheduler: &'a dyn TaskScheduler,
    ) -> Self {
        Self {
            store,
            audit,
            codec,
            dispatcher,
            scheduler,
            purpose: &NoPurposeChanges,
            config: CommitConfig::default(),
        }
    }

    pub fn with_purpose_processor(mut self, purpose: &'a dyn PurposeChangeProcessor) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn with_config(mut self, config: CommitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CommitConfig {
        &self.config
    }

    /// Commit one batch produced by `task`.
    pub fn commit(
        &self,
        task: &AutomationTask,
        operations: Vec<Operation>,
    ) -> CommitResult<ChangesTracker> {
        if let Err(err) = validate_batch(&operations, self.config.max_operations) {
            warn!("rejecting batch of {}: {err}", task.display_name());
            return Err(CommitError::InvalidBatch(err));
        }
        let (schema, violations) = SchemaSnapshot::load(self.store, &operations)?;
        if !violations.is_empty() {
            let err = OperationError::invalid_batch(violations);
            warn!("rejecting batch of {}: {err}", task.display_name());
            return Err(CommitError::InvalidBatch(err));
        }
        let groups = OperationGroups::partition(operations);
        debug!(
            "committing {} operations of {} at depth {}",
            groups.len(),
            task.display_name(),
            task.recursion_depth
        );

        let mut run = CommitRun::new(self, task, schema);
        match run.execute(groups) {
            Ok(()) => {
                let tracker = run.tracker;
                info!(
                    "committed {}: {} created, {} updated, {} removed documents; {} created, {} updated, {} removed links",
                    task.display_name(),
                    tracker.created_documents().count(),
                    tracker.updated_documents().count(),
                    tracker.removed_documents().count(),
                    tracker.created_links().count(),
                    tracker.updated_links().count(),
                    tracker.removed_links().count(),
                );
                Ok(tracker)
            }
            Err(StageError { stage, failure }) => {
                warn!(
                    "commit of {} failed during {stage}, earlier changes stay applied: {failure}",
                    task.display_name()
                );
                Err(CommitError::partial(stage, failure, run.tracker))
            }
        }
    }
}

pub(crate) struct StageError {
    stage: Stage,
    failure: StageFailure,
}

fn at(stage: Stage) -> impl FnOnce(StageFailure) -> StageError {
    move |failure| StageError { stage, failure }
}

/// State of one commit invocation. Never shared.
pub(crate) struct CommitRun<'c, 'a> {
    pub(crate) committer: &'c BatchCommitter<'a>,
    pub(crate) task: &'c AutomationTask,
    pub(crate) actor: AuditActor,
    pub(crate) now: DateTime<Utc>,
    pub(crate) tracker: ChangesTracker,
    pub(crate) resolver: CorrelationResolver,
    pub(crate) schema: SchemaSnapshot,
    pub(crate) counters: UsageCounters,
    /// Created entities awaiting their creation event, in stored form.
    pub(crate) pending_documents: IndexMap<DocumentId, Document>,
    pub(crate) pending_links: IndexMap<LinkId, LinkInstance>,
    /// Entities created and then updated in this commit.
    pub(crate) updated_document_creations: IndexSet<DocumentId>,
    pub(crate) updated_link_creations: IndexSet<LinkId>,
}

impl<'c, 'a> CommitRun<'c, 'a> {
    fn new(
        committer: &'c BatchCommitter<'a>,
        task: &'c AutomationTask,
        schema: SchemaSnapshot,
    ) -> Self {
        Self {
            committer,
            task,
            actor: AuditActor::new(task.initiator.clone(), task.display_name()),
            now: Utc::now(),
            tracker: ChangesTracker::new(),
            resolver: CorrelationResolver::new(),
            schema,
            counters: UsageCounters::default(),
            pending_documents: IndexMap::new(),
            pending_links: IndexMap::new(),
            updated_document_creations: IndexSet::new(),
            updated_link_creations: IndexSet::new(),
        }
    }

    fn execute(&mut self, groups: OperationGroups) -> Result<(), StageError> {
        let OperationGroups {
            document_creates,
            document_updates,
            document_removes,
            link_creates,
            link_updates,
            link_removes,
            side_effects,
        } = groups;

        self.create_documents(document_creates)
            .map_err(at(Stage::CreateDocuments))?;
        self.update_documents(document_updates)
            .map_err(at(Stage::UpdateDocuments))?;
        self.remove_documents(document_removes)
            .map_err(at(Stage::RemoveDocuments))?;
        self.create_links(link_creates)
            .map_err(at(Stage::CreateLinks))?;
        self.remove_links(link_removes)
            .map_err(at(Stage::RemoveLinks))?;
        self.update_links(link_updates)
            .map_err(at(Stage::UpdateLinks))?;
        self.dispatch_creations()
            .map_err(at(Stage::DispatchCreations))?;
        self.write_back_counters()
            .map_err(at(Stage::WriteBackCounters))?;
        self.collect_side_effects(side_effects);
        self.propagate_changes()
            .map_err(at(Stage::PropagateChanges))?;
        Ok(())
    }

    pub(crate) fn store(&self) -> &'a dyn Store {
        self.committer.store
    }

    pub(crate) fn codec(&self) -> &'a dyn ConstraintCodec {
        self.committer.codec
    }

    // ==================== Audit ====================

    pub(crate) fn audit_create(&self, target: AuditTarget, data: &DataDocument) {
        if !self.committer.config.audit {
            return;
        }
        if let Err(err) = self.committer.audit.register_create(target, &self.actor, data) {
            warn!("failed to audit creation: {err}");
        }
    }

    pub(crate) fn audit_data_change(&self, target: AuditTarget, change: DataChange) {
        if !self.committer.config.audit {
            return;
        }
        if let Err(err) = self
            .committer
            .audit
            .register_data_change(target, &self.actor, change)
        {
            warn!("failed to audit data change: {err}");
        }
    }

    pub(crate) fn audit_delete(&self, target: AuditTarget, data: &DataDocument) {
        if !self.committer.config.audit {
            return;
        }
        if let Err(err) = self.committer.audit.register_delete(target, &self.actor, data) {
            warn!("failed to audit deletion: {err}");
        }
    }
}
