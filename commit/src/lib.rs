//! Cascade Commit
//!
//! Applies the operations produced by one automation run to the store and
//! propagates the resulting changes.
//!
//! Responsibilities:
//! - Reject incomplete batches, or batches naming an unknown collection or
//!   link type, before anything is written
//! - Apply creates, updates and removals in a fixed stage order
//! - Resolve provisional ids of entities created in the same batch
//! - Audit every data change and maintain attribute usage counters
//! - Re-trigger dependent automations inline or through the scheduler
//! - Summarize the net effect in a `ChangesTracker`
//!
//! # Module Structure
//!
//! - `committer` - `BatchCommitter` and the per-commit run state
//! - `stages` - One method per stage, plus shared schema and counter state
//! - `resolver` - Provisional to real id mapping
//! - `tracker` - Net change summary
//! - `config` - Limits and switches, from TOML and the environment

mod committer;
mod config;
mod error;
mod resolver;
mod stages;
mod tracker;

pub use committer::BatchCommitter;
pub use config::{
    CommitConfig, DEFAULT_MAX_OPERATIONS, ENV_AUDIT, ENV_MAX_OPERATIONS, ENV_PUSH_METADATA_CHANGES,
};
pub use error::{CommitError, CommitResult, ConfigError, ConfigResult, Stage, StageFailure};
pub use resolver::CorrelationResolver;
pub use tracker::ChangesTracker;
