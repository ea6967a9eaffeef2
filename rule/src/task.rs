//! Automation task context.

use serde::{Deserialize, Serialize};

use cascade_core::{AttributeId, Document, LinkInstance, UserId};

use crate::SYNCHRONOUS_DEPTH;

/// What kind of automation produced a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AutomationKind {
    /// A user-authored rule.
    Rule { name: String },
    /// A computed attribute function.
    Function { attribute_id: AttributeId },
    /// A bulk auto-link run owned by a rule.
    AutoLinkBatch { rule_name: String },
}

/// The entity whose data change fired the automation, as it was before that change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum TriggerOrigin {
    Document(Document),
    Link(LinkInstance),
}

/// Context of one automation firing.
///
/// Owned by a single commit. `recursion_depth` never changes for a given
/// task; follow-ups are new tasks one level deeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationTask {
    pub initiator: UserId,
    pub kind: AutomationKind,
    pub origin: Option<TriggerOrigin>,
    pub recursion_depth: u32,
    /// Interactive client session that started the automation, if any.
    pub app_id: Option<String>,
}

impl AutomationTask {
    pub fn new(initiator: impl Into<UserId>, kind: AutomationKind) -> Self {
        Self {
            initiator: initiator.into(),
            kind,
            origin: None,
            recursion_depth: SYNCHRONOUS_DEPTH,
            app_id: None,
        }
    }

    pub fn rule(initiator: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self::new(initiator, AutomationKind::Rule { name: name.into() })
    }

    pub fn function(initiator: impl Into<UserId>, attribute_id: impl Into<AttributeId>) -> Self {
        Self::new(
            initiator,
            AutomationKind::Function {
                attribute_id: attribute_id.into(),
            },
        )
    }

    pub fn with_origin(mut self, origin: TriggerOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_depth(mut self, recursion_depth: u32) -> Self {
        self.recursion_depth = recursion_depth;
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Name recorded in the audit trail.
    pub fn display_name(&self) -> String {
        match &self.kind {
            AutomationKind::Rule { name } => name.clone(),
            AutomationKind::Function { attribute_id } => format!("={}", attribute_id),
            AutomationKind::AutoLinkBatch { rule_name } => rule_name.clone(),
        }
    }

    pub fn rule_name(&self) -> Option<&str> {
        match &self.kind {
            AutomationKind::Rule { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_rule(&self) -> bool {
        matches!(self.kind, AutomationKind::Rule { .. })
    }

    /// Started from a client session that can receive side-effect requests.
    pub fn is_interactive(&self) -> bool {
        self.app_id.is_some()
    }

    pub fn origin_document(&self) -> Option<&Document> {
        match &self.origin {
            Some(TriggerOrigin::Document(document)) => Some(document),
            _ => None,
        }
    }

    pub fn origin_link(&self) -> Option<&LinkInstance> {
        match &self.origin {
            Some(TriggerOrigin::Link(link)) => Some(link),
            _ => None,
        }
    }

    /// The same automation one level deeper, without a session or origin.
    pub fn follow_up(&self) -> Self {
        Self {
            initiator: self.initiator.clone(),
            kind: self.kind.clone(),
            origin: None,
            recursion_depth: self.recursion_depth + 1,
            app_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::data;

    #[test]
    fn test_display_names() {
        assert_eq!(AutomationTask::rule("u1", "Close tasks").display_name(), "Close tasks");
        assert_eq!(AutomationTask::function("u1", "a3").display_name(), "=a3");
        let batch = AutomationTask::new(
            "u1",
            AutomationKind::AutoLinkBatch {
                rule_name: "Link orders".to_string(),
            },
        );
        assert_eq!(batch.display_name(), "Link orders");
        assert!(!batch.is_rule());
    }

    #[test]
    fn test_follow_up_is_one_level_deeper() {
        // GIVEN
        let task = AutomationTask::rule("u1", "R")
            .with_depth(1)
            .with_app_id("app-1")
            .with_origin(TriggerOrigin::Document(Document::new(
                "d1".into(),
                "c1".into(),
                data!(),
            )));

        // WHEN
        let follow_up = task.follow_up();

        // THEN
        assert_eq!(follow_up.recursion_depth, 2);
        assert_eq!(task.recursion_depth, 1);
        assert!(!follow_up.is_interactive());
        assert!(follow_up.origin.is_none());
        assert_eq!(follow_up.rule_name(), Some("R"));
    }

    #[test]
    fn test_origin_accessors() {
        let task = AutomationTask::rule("u1", "R").with_origin(TriggerOrigin::Document(
            Document::new("d1".into(), "c1".into(), data!()),
        ));

        assert!(task.origin_document().is_some());
        assert!(task.origin_link().is_none());
    }
}
