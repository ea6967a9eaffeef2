//! Side-effect requests.
//!
//! These are collected by the committer and handed to the caller, which
//! delivers them to the interactive session that started the automation.

use serde::{Deserialize, Serialize};

use cascade_core::{AttributeId, CollectionId};

use crate::reference::DocumentRef;

/// Print either one attribute of a document or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PrintRequest {
    Attribute {
        collection_id: CollectionId,
        document: DocumentRef,
        attribute_id: AttributeId,
        skip_dialog: bool,
    },
    Text {
        text: String,
        skip_dialog: bool,
    },
}

/// Open a view, optionally focused on a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub view_id: String,
    pub document: Option<DocumentRef>,
    pub attribute_id: Option<AttributeId>,
    pub search: Option<String>,
    pub new_window: bool,
}

impl NavigationRequest {
    pub fn to_view(view_id: impl Into<String>) -> Self {
        Self {
            view_id: view_id.into(),
            document: None,
            attribute_id: None,
            search: None,
            new_window: false,
        }
    }
}

/// Open the user's mail client with a prepared message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendEmailRequest {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserMessageKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Show a message to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessageRequest {
    pub kind: UserMessageKind,
    pub message: String,
}

impl UserMessageRequest {
    pub fn new(kind: UserMessageKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A request for the interactive session, not a data mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "request", rename_all = "snake_case")]
pub enum SideEffectRequest {
    Print(PrintRequest),
    Navigate(NavigationRequest),
    SendEmail(SendEmailRequest),
    UserMessage(UserMessageRequest),
}

impl SideEffectRequest {
    /// Why the request cannot be delivered, if it is incomplete.
    pub fn incompleteness(&self) -> Option<&'static str> {
        match self {
            SideEffectRequest::Print(PrintRequest::Attribute {
                collection_id,
                document,
                attribute_id,
                ..
            }) => {
                if collection_id.is_empty() {
                    Some("missing collection")
                } else if document.is_empty() {
                    Some("missing document")
                } else if attribute_id.is_empty() {
                    Some("missing attribute")
                } else {
                    None
                }
            }
            SideEffectRequest::Print(PrintRequest::Text { text, .. }) => {
                text.is_empty().then_some("missing text")
            }
            SideEffectRequest::Navigate(request) => {
                request.view_id.is_empty().then_some("missing view")
            }
            SideEffectRequest::SendEmail(request) => {
                let no_recipient = request.recipients.iter().all(|r| r.trim().is_empty());
                no_recipient.then_some("missing recipient")
            }
            SideEffectRequest::UserMessage(request) => {
                request.message.is_empty().then_some("missing message")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_requests() {
        let email = SideEffectRequest::SendEmail(SendEmailRequest {
            recipients: vec![" ".to_string()],
            subject: "Hello".to_string(),
            body: String::new(),
        });
        let print = SideEffectRequest::Print(PrintRequest::Attribute {
            collection_id: "c1".into(),
            document: DocumentRef::pending("c9"),
            attribute_id: "".into(),
            skip_dialog: false,
        });

        assert_eq!(email.incompleteness(), Some("missing recipient"));
        assert_eq!(print.incompleteness(), Some("missing attribute"));
    }

    #[test]
    fn test_complete_requests() {
        let navigate = SideEffectRequest::Navigate(NavigationRequest::to_view("v1"));
        let message =
            SideEffectRequest::UserMessage(UserMessageRequest::new(UserMessageKind::Info, "Done"));

        assert_eq!(navigate.incompleteness(), None);
        assert_eq!(message.incompleteness(), None);
    }
}
