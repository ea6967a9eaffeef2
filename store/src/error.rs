//! Store error types.

use cascade_core::{CollectionId, DocumentId, LinkId, LinkTypeId};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Link instance not found.
    #[error("Link instance not found: {0}")]
    LinkNotFound(LinkId),

    /// Collection not found.
    #[error("Collection not found: {0}")]
    CollectionNotFound(CollectionId),

    /// Link type not found.
    #[error("Link type not found: {0}")]
    LinkTypeNotFound(LinkTypeId),

    /// The store lock was poisoned by a panicking writer.
    #[error("Store state poisoned")]
    Poisoned,

    /// Backend failure.
    #[error("Store backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
