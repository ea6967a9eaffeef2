//! Commit error types.

use std::fmt;

use thiserror::Error;

use cascade_operation::OperationError;
use cascade_rule::RuleError;
use cascade_store::StoreError;

use crate::tracker::ChangesTracker;

/// Result type for commit operations.
pub type CommitResult<T> = Result<T, CommitError>;

/// Commit pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreateDocuments,
    UpdateDocuments,
    RemoveDocuments,
    CreateLinks,
    RemoveLinks,
    UpdateLinks,
    DispatchCreations,
    WriteBackCounters,
    PropagateChanges,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CreateDocuments => "create documents",
            Stage::UpdateDocuments => "update documents",
            Stage::RemoveDocuments => "remove documents",
            Stage::CreateLinks => "create links",
            Stage::RemoveLinks => "remove links",
            Stage::UpdateLinks => "update links",
            Stage::DispatchCreations => "dispatch creations",
            Stage::WriteBackCounters => "write back counters",
            Stage::PropagateChanges => "propagate changes",
        };
        f.write_str(name)
    }
}

/// A collaborator failure inside a stage.
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("dispatcher error: {0}")]
    Dispatch(#[from] RuleError),
}

/// Commit errors.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The batch was rejected before any mutation.
    #[error("{0}")]
    InvalidBatch(#[from] OperationError),

    /// A stage failed after earlier mutations were applied. Nothing is rolled
    /// back; `tracker` describes what was applied.
    #[error("commit failed during {stage}: {source}")]
    Partial {
        stage: Stage,
        source: StageFailure,
        tracker: Box<ChangesTracker>,
    },

    /// Reading the batch's collections and link types failed before any
    /// mutation.
    #[error("schema lookup failed: {0}")]
    SchemaLookup(#[from] StoreError),
}

impl CommitError {
    pub fn partial(stage: Stage, source: StageFailure, tracker: ChangesTracker) -> Self {
        Self::Partial {
            stage,
            source,
            tracker: Box::new(tracker),
        }
    }

    /// Changes applied before the failure, if any were.
    pub fn applied_changes(&self) -> Option<&ChangesTracker> {
        match self {
            Self::Partial { tracker, .. } => Some(tracker),
            Self::InvalidBatch(_) | Self::SchemaLookup(_) => None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse commit configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
