//! Cascade Operation
//!
//! Typed descriptions of the mutations and side-effect requests an automation
//! hands to the committer.
//!
//! Responsibilities:
//! - Model each operation kind as one variant of `Operation`
//! - Reference entities created earlier in the same batch through pending ids
//! - Check operation completeness for a whole batch at once
//! - Split a batch into per-kind groups
//!
//! # Module Structure
//!
//! - `reference` - Existing or pending references to documents and links
//! - `operation` - The `Operation` sum type and its payloads
//! - `request` - Print, navigation, email and user-message requests
//! - `violation` - Collected completeness violations
//! - `validation` - Batch completeness checks
//! - `group` - Partitioning by kind and grouping by entity

mod error;
mod group;
mod operation;
mod reference;
mod request;
mod validation;
mod violation;

pub use error::{OperationError, OperationResult};
pub use group::{group_by_key, OperationGroups};
pub use operation::{
    DocumentCreate, DocumentRemove, DocumentUpdate, LinkCreate, LinkRemove, LinkUpdate, Operation,
};
pub use reference::{DocumentRef, LinkRef};
pub use request::{
    NavigationRequest, PrintRequest, SendEmailRequest, SideEffectRequest, UserMessageKind,
    UserMessageRequest,
};
pub use validation::validate_batch;
pub use violation::{Violation, Violations};
