//! Cascade Journal
//!
//! Audit trail of committed changes.
//!
//! Responsibilities:
//! - Describe creations, data changes and deletions of documents and links
//! - Record who made the change and through which automation
//! - Provide an in-memory sink with sequence numbers for inspection

mod entry;
mod error;
mod log;

pub use entry::{AuditActor, AuditEntry, AuditRecord, AuditTarget, DataChange, ResourceType, Sequence};
pub use error::{AuditError, AuditResult};
pub use log::{AuditSink, MemoryAuditLog};
