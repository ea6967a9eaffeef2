//! Cascade Rule
//!
//! Automation context and re-trigger decisions for committed changes.
//!
//! Responsibilities:
//! - Describe the automation whose output is being committed
//! - Decide how an updated entity re-triggers dependent automations
//! - Define the dispatcher, scheduler and purpose-change contracts
//! - Provide in-memory implementations of those contracts

mod dispatch;
mod error;
mod event;
mod retrigger;
mod task;

pub use dispatch::{
    DispatchCall, NoPurposeChanges, PurposeChangeProcessor, QueueScheduler, RecordingDispatcher,
    TaskScheduler, TriggerDispatcher,
};
pub use error::{RuleError, RuleResult};
pub use event::{FollowUpTask, FollowUpTrigger, UpdateDocumentEvent, UpdateLinkEvent};
pub use retrigger::{plan_retrigger, EntityVersions, Retrigger};
pub use task::{AutomationKind, AutomationTask, TriggerOrigin};

/// The only recursion depth allowed to re-trigger automations synchronously.
pub const SYNCHRONOUS_DEPTH: u32 = 0;
