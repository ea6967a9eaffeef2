//! Cascade Core Types
//!
//! This crate provides the foundational types shared by every cascade crate:
//! - Identity types (DocumentId, LinkId, CollectionId, LinkTypeId, ...)
//! - Provisional identifiers (CorrelationId, TemplateId)
//! - Attribute data (the DataDocument map and the `data!` macro)
//! - Entity structures (Document, LinkInstance and their creation drafts)
//! - Schema structures (Collection, LinkType, Attribute, Constraint)

mod entity;
mod id;
mod schema;
mod value;

pub use entity::*;
pub use id::*;
pub use schema::*;
pub use value::*;
