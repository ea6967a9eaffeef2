//! Events handed to automation collaborators.

use std::collections::BTreeSet;

use serde::Serialize;

use cascade_core::{AttributeId, Document, LinkInstance};

use crate::task::AutomationTask;

/// A document data change: `before` and `after` carry stored values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateDocumentEvent {
    pub before: Document,
    pub after: Document,
}

/// A link data change: `before` and `after` carry stored values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateLinkEvent {
    pub before: LinkInstance,
    pub after: LinkInstance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FollowUpTrigger {
    Document(UpdateDocumentEvent),
    Link(UpdateLinkEvent),
}

/// Deferred re-evaluation submitted to the scheduler instead of running inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUpTask {
    /// The automation one level deeper than the one that produced the change.
    pub task: AutomationTask,
    pub trigger: FollowUpTrigger,
    pub changed_attributes: BTreeSet<AttributeId>,
}

impl FollowUpTask {
    pub fn for_document(
        parent: &AutomationTask,
        event: UpdateDocumentEvent,
        changed_attributes: BTreeSet<AttributeId>,
    ) -> Self {
        Self {
            task: parent.follow_up(),
            trigger: FollowUpTrigger::Document(event),
            changed_attributes,
        }
    }

    pub fn for_link(
        parent: &AutomationTask,
        event: UpdateLinkEvent,
        changed_attributes: BTreeSet<AttributeId>,
    ) -> Self {
        Self {
            task: parent.follow_up(),
            trigger: FollowUpTrigger::Link(event),
            changed_attributes,
        }
    }

    pub fn depth(&self) -> u32 {
        self.task.recursion_depth
    }
}
