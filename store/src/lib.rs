//! Cascade Store
//!
//! Persistence contracts consumed by the batch committer, plus an in-memory
//! reference implementation.
//!
//! Responsibilities:
//! - Bulk-create documents and link instances, assigning real ids
//! - Patch attribute data atomically per entity
//! - Update entity metadata, delete entities, look entities up by id sets
//! - Read and write back collections and link types with computed counts

mod contract;
mod error;
mod index;
mod memory;

pub use contract::{RecordStore, SchemaStore, Store};
pub use error::{StoreError, StoreResult};
pub use index::LinkIndex;
pub use memory::{MemoryStore, StoreStats};
