//! Re-trigger decisions for committed updates.
//!
//! One automation firing sees three versions of an entity:
//!
//! 1. `original` - before the user's edit (unknown when fired by an action button)
//! 2. `user_edited` - with the value the user entered, i.e. the stored state before the patch
//! 3. `computed` - with the value the automation computed
//!
//! The firing was caused by 1 -> 2, so dependent automations must now see 2 -> 3.

use crate::task::AutomationTask;
use crate::SYNCHRONOUS_DEPTH;

/// The three versions of one entity across an automation firing.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityVersions<T> {
    pub original: Option<T>,
    pub user_edited: T,
    pub computed: T,
}

impl<T> EntityVersions<T> {
    pub fn new(original: Option<T>, user_edited: T, computed: T) -> Self {
        Self {
            original,
            user_edited,
            computed,
        }
    }

    /// The state dependent automations compare against when run inline.
    pub fn inline_before(&self) -> &T {
        &self.user_edited
    }

    /// The state a deferred follow-up compares against: the original when known.
    pub fn deferred_before(&self) -> &T {
        self.original.as_ref().unwrap_or(&self.user_edited)
    }
}

/// How an updated entity re-triggers dependent automations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrigger {
    /// Nothing to re-trigger.
    None,
    /// Created in the same batch: report a creation only.
    Created,
    /// Re-evaluate dependent automations inline.
    Synchronous,
    /// Submit a follow-up task to the scheduler.
    Deferred,
}

/// Decide how an updated entity re-triggers automations.
///
/// Depth is the only thing separating inline from deferred re-evaluation, so
/// synchronous recursion never goes deeper than one level.
pub fn plan_retrigger(task: &AutomationTask, created_in_batch: bool) -> Retrigger {
    if created_in_batch {
        return Retrigger::Created;
    }
    if !task.is_rule() {
        return Retrigger::None;
    }
    if task.recursion_depth == SYNCHRONOUS_DEPTH {
        Retrigger::Synchronous
    } else {
        Retrigger::Deferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_zero_rule_is_synchronous() {
        let task = AutomationTask::rule("u1", "R");

        assert_eq!(plan_retrigger(&task, false), Retrigger::Synchronous);
    }

    #[test]
    fn test_deeper_rule_is_deferred() {
        for depth in [1, 2, 10] {
            let task = AutomationTask::rule("u1", "R").with_depth(depth);

            assert_eq!(plan_retrigger(&task, false), Retrigger::Deferred);
        }
    }

    #[test]
    fn test_created_entities_report_creation() {
        let task = AutomationTask::rule("u1", "R").with_depth(3);

        assert_eq!(plan_retrigger(&task, true), Retrigger::Created);
    }

    #[test]
    fn test_functions_never_retrigger_updates() {
        let task = AutomationTask::function("u1", "a1");

        assert_eq!(plan_retrigger(&task, false), Retrigger::None);
        assert_eq!(plan_retrigger(&task.with_depth(1), false), Retrigger::None);
    }

    #[test]
    fn test_versions_before_states() {
        // GIVEN
        let known = EntityVersions::new(Some("s0"), "s1", "s2");
        let unknown = EntityVersions::new(None, "s1", "s2");

        // THEN
        assert_eq!(*known.inline_before(), "s1");
        assert_eq!(*known.deferred_before(), "s0");
        assert_eq!(*unknown.deferred_before(), "s1");
    }
}
