//! Collaborator contracts and their in-memory implementations.

use std::collections::VecDeque;
use std::sync::Mutex;

use cascade_core::{Collection, Document, LinkInstance};

use crate::error::{RuleError, RuleResult};
use crate::event::{FollowUpTask, UpdateDocumentEvent, UpdateLinkEvent};

/// Runs dependent automations synchronously.
pub trait TriggerDispatcher {
    fn on_create_document(&self, document: &Document) -> RuleResult<()>;

    /// `rule_name` is the rule whose output caused the change.
    fn on_update_document(&self, event: &UpdateDocumentEvent, rule_name: &str) -> RuleResult<()>;

    fn on_create_link(&self, link: &LinkInstance) -> RuleResult<()>;

    fn on_update_link(&self, event: &UpdateLinkEvent, rule_name: &str) -> RuleResult<()>;

    /// Called once per commit with the decoded updated entities so a running
    /// automation can refresh what it loaded earlier.
    fn propagate_changes(&self, _documents: &[Document], _links: &[LinkInstance]) -> RuleResult<()> {
        Ok(())
    }
}

/// Accepts follow-up tasks for asynchronous execution. Fire-and-forget.
pub trait TaskScheduler {
    fn submit(&self, task: FollowUpTask) -> RuleResult<()>;
}

/// Notified when a task-list document's data changes.
pub trait PurposeChangeProcessor {
    fn process_changes(&self, event: &UpdateDocumentEvent, collection: &Collection) -> RuleResult<()>;
}

/// Purpose-change processor that ignores every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPurposeChanges;

impl PurposeChangeProcessor for NoPurposeChanges {
    fn process_changes(&self, _event: &UpdateDocumentEvent, _collection: &Collection) -> RuleResult<()> {
        Ok(())
    }
}

/// In-memory FIFO scheduler.
#[derive(Debug, Default)]
pub struct QueueScheduler {
    queue: Mutex<VecDeque<FollowUpTask>>,
}

impl QueueScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued task, oldest first.
    pub fn drain(&self) -> RuleResult<Vec<FollowUpTask>> {
        let mut queue = self.queue.lock().map_err(|_| RuleError::Poisoned)?;
        Ok(queue.drain(..).collect())
    }

    pub fn len(&self) -> RuleResult<usize> {
        Ok(self.queue.lock().map_err(|_| RuleError::Poisoned)?.len())
    }

    pub fn is_empty(&self) -> RuleResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl TaskScheduler for QueueScheduler {
    fn submit(&self, task: FollowUpTask) -> RuleResult<()> {
        let mut queue = self.queue.lock().map_err(|_| RuleError::Poisoned)?;
        queue.push_back(task);
        Ok(())
    }
}

/// One call received by a `RecordingDispatcher`.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchCall {
    CreateDocument(Document),
    UpdateDocument {
        event: UpdateDocumentEvent,
        rule_name: String,
    },
    CreateLink(LinkInstance),
    UpdateLink {
        event: UpdateLinkEvent,
        rule_name: String,
    },
    Propagate {
        documents: Vec<Document>,
        links: Vec<LinkInstance>,
    },
}

/// Dispatcher that records calls instead of running automations.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<DispatchCall>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: DispatchCall) -> RuleResult<()> {
        self.calls.lock().map_err(|_| RuleError::Poisoned)?.push(call);
        Ok(())
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> RuleResult<Vec<DispatchCall>> {
        Ok(self.calls.lock().map_err(|_| RuleError::Poisoned)?.clone())
    }

    /// Number of synchronous update re-evaluations so far.
    pub fn update_calls(&self) -> RuleResult<usize> {
        Ok(self
            .calls()?
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DispatchCall::UpdateDocument { .. } | DispatchCall::UpdateLink { .. }
                )
            })
            .count())
    }
}

impl TriggerDispatcher for RecordingDispatcher {
    fn on_create_document(&self, document: &Document) -> RuleResult<()> {
        self.record(DispatchCall::CreateDocument(document.clone()))
    }

    fn on_update_document(&self, event: &UpdateDocumentEvent, rule_name: &str) -> RuleResult<()> {
        self.record(DispatchCall::UpdateDocument {
            event: event.clone(),
            rule_name: rule_name.to_string(),
        })
    }

    fn on_create_link(&self, link: &LinkInstance) -> RuleResult<()> {
        self.record(DispatchCall::CreateLink(link.clone()))
    }

    fn on_update_link(&self, event: &UpdateLinkEvent, rule_name: &str) -> RuleResult<()> {
        self.record(DispatchCall::UpdateLink {
            event: event.clone(),
            rule_name: rule_name.to_string(),
        })
    }

    fn propagate_changes(&self, documents: &[Document], links: &[LinkInstance]) -> RuleResult<()> {
        self.record(DispatchCall::Propagate {
            documents: documents.to_vec(),
            links: links.to_vec(),
        })
    }
}
