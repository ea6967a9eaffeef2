//! Audit sink contract and in-memory log.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use cascade_core::DataDocument;

use crate::entry::{AuditActor, AuditEntry, AuditRecord, AuditTarget, DataChange, Sequence};
use crate::error::{AuditError, AuditResult};

/// Durable log of create / data-change / delete events.
///
/// Callers treat every method as fire-and-forget: an error is reported but
/// never undoes the change it describes.
pub trait AuditSink {
    /// Record a creation with the stored (encoded) initial data.
    fn register_create(
        &self,
        target: AuditTarget,
        actor: &AuditActor,
        data: &DataDocument,
    ) -> AuditResult<()>;

    /// Record a data patch with encoded and decoded before/after payloads.
    fn register_data_change(
        &self,
        target: AuditTarget,
        actor: &AuditActor,
        change: DataChange,
    ) -> AuditResult<()>;

    /// Record a deletion with the decoded final data.
    fn register_delete(
        &self,
        target: AuditTarget,
        actor: &AuditActor,
        data: &DataDocument,
    ) -> AuditResult<()>;
}

#[derive(Debug)]
struct LogState {
    records: Vec<AuditRecord>,
    next_sequence: Sequence,
}

/// In-memory audit log for testing and simple use cases.
#[derive(Debug)]
pub struct MemoryAuditLog {
    state: Mutex<LogState>,
}

impl Default for MemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuditLog {
    /// Create a new empty audit log.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LogState {
                records: Vec::new(),
                next_sequence: 1,
            }),
        }
    }

    fn state(&self) -> AuditResult<MutexGuard<'_, LogState>> {
        self.state.lock().map_err(|_| AuditError::Poisoned)
    }

    /// Append an entry, returning its sequence number.
    pub fn append(&self, entry: AuditEntry) -> AuditResult<Sequence> {
        let mut state = self.state()?;
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.records.push(AuditRecord {
            sequence,
            recorded_at: Utc::now(),
            entry,
        });
        Ok(sequence)
    }

    /// Snapshot of all records, oldest first.
    pub fn records(&self) -> AuditResult<Vec<AuditRecord>> {
        Ok(self.state()?.records.clone())
    }

    /// Entries only, oldest first.
    pub fn entries(&self) -> AuditResult<Vec<AuditEntry>> {
        Ok(self
            .state()?
            .records
            .iter()
            .map(|r| r.entry.clone())
            .collect())
    }

    /// Entries concerning one resource id, oldest first.
    pub fn entries_for(&self, resource_id: &str) -> AuditResult<Vec<AuditEntry>> {
        Ok(self
            .state()?
            .records
            .iter()
            .filter(|r| r.entry.target().resource_id == resource_id)
            .map(|r| r.entry.clone())
            .collect())
    }

    pub fn len(&self) -> AuditResult<usize> {
        Ok(self.state()?.records.len())
    }

    pub fn is_empty(&self) -> AuditResult<bool> {
        Ok(self.state()?.records.is_empty())
    }

    /// Clear the log (for testing).
    pub fn clear(&self) -> AuditResult<()> {
        let mut state = self.state()?;
        state.records.clear();
        state.next_sequence = 1;
        Ok(())
    }
}

impl AuditSink for MemoryAuditLog {
    fn register_create(
        &self,
        target: AuditTarget,
        actor: &AuditActor,
        data: &DataDocument,
    ) -> AuditResult<()> {
        self.append(AuditEntry::Create {
            target,
            actor: actor.clone(),
            data: data.clone(),
        })
        .map(|_| ())
    }

    fn register_data_change(
        &self,
        target: AuditTarget,
        actor: &AuditActor,
        change: DataChange,
    ) -> AuditResult<()> {
        self.append(AuditEntry::DataChange {
            target,
            actor: actor.clone(),
            change,
        })
        .map(|_| ())
    }

    fn register_delete(
        &self,
        target: AuditTarget,
        actor: &AuditActor,
        data: &DataDocument,
    ) -> AuditResult<()> {
        self.append(AuditEntry::Delete {
            target,
            actor: actor.clone(),
            data: data.clone(),
        })
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::{data, UserId};
    use pretty_assertions::assert_eq;

    fn actor() -> AuditActor {
        AuditActor::new(UserId::new("u1"), "Rule 1")
    }

    #[test]
    fn test_sequence_numbers_increase() {
        // GIVEN
        let log = MemoryAuditLog::new();

        // WHEN
        log.register_create(AuditTarget::document("c1", "d1"), &actor(), &data!())
            .unwrap();
        log.register_delete(AuditTarget::document("c1", "d1"), &actor(), &data!())
            .unwrap();

        // THEN
        let sequences: Vec<_> = log.records().unwrap().iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
    }

    #[test]
    fn test_entries_for_filters_by_resource() {
        // GIVEN
        let log = MemoryAuditLog::new();
        let change = DataChange {
            before: data! { "a1" => 1 },
            after: data! { "a1" => 2 },
            before_decoded: data! { "a1" => 1 },
            after_decoded: data! { "a1" => 2 },
        };
        log.register_data_change(AuditTarget::document("c1", "d1"), &actor(), change.clone())
            .unwrap();
        log.register_create(AuditTarget::link("lt1", "l1"), &actor(), &data!())
            .unwrap();

        // WHEN
        let entries = log.entries_for("d1").unwrap();

        // THEN
        assert_eq!(
            entries,
            vec![AuditEntry::DataChange {
                target: AuditTarget::document("c1", "d1"),
                actor: actor(),
                change,
            }]
        );
    }

    #[test]
    fn test_clear_resets_sequence() {
        let log = MemoryAuditLog::new();
        log.register_create(AuditTarget::document("c1", "d1"), &actor(), &data!())
            .unwrap();

        log.clear().unwrap();
        let sequence = log
            .append(AuditEntry::Delete {
                target: AuditTarget::document("c1", "d2"),
                actor: actor(),
                data: data!(),
            })
            .unwrap();

        assert_eq!(sequence, 1);
        assert!(!log.is_empty().unwrap());
    }
}
