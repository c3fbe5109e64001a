// State Store - current status table, read by observers

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::domain::{JobId, ProbeStatus};

/// Observer-visible runtime state of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStateSnapshot {
    pub enabled: bool,
    pub last_status: ProbeStatus,
    pub last_run_at: Option<DateTime<Utc>>,
    pub running: bool,
}

#[derive(Debug, Clone)]
struct StatusRecord {
    last_status: ProbeStatus,
    last_run_at: Option<DateTime<Utc>>,
}

/// In-memory table of each job's latest probe result.
///
/// Entries live exactly as long as their job: inserted at add, dropped at
/// remove. Status and timestamp are replaced together under one write lock,
/// so an observer never sees a timestamp without its matching status.
pub struct StateStore {
    inner: RwLock<HashMap<JobId, StatusRecord>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Create the entry for a newly added job (status Unknown, never run)
    pub fn insert(&self, id: &str) {
        self.inner.write().unwrap().insert(
            id.to_string(),
            StatusRecord {
                last_status: ProbeStatus::Unknown,
                last_run_at: None,
            },
        );
    }

    /// Drop the entry for a removed job
    pub fn remove(&self, id: &str) {
        self.inner.write().unwrap().remove(id);
    }

    /// Record a completed execution. Status and timestamp are written as a
    /// unit. No-op if the job was removed while the run was in flight.
    pub fn record(&self, id: &str, status: ProbeStatus, at: DateTime<Utc>) {
        if let Some(record) = self.inner.write().unwrap().get_mut(id) {
            record.last_status = status;
            record.last_run_at = Some(at);
        }
    }

    /// Latest status and completion time for a job, if it still exists
    pub fn status_of(&self, id: &str) -> Option<(ProbeStatus, Option<DateTime<Utc>>)> {
        self.inner
            .read()
            .unwrap()
            .get(id)
            .map(|r| (r.last_status.clone(), r.last_run_at))
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_entry_is_unknown_with_no_timestamp() {
        let store = StateStore::new();
        store.insert("a");
        assert_eq!(store.status_of("a"), Some((ProbeStatus::Unknown, None)));
    }

    #[test]
    fn record_replaces_status_and_timestamp_together() {
        let store = StateStore::new();
        store.insert("a");

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        store.record("a", ProbeStatus::Healthy, at);

        assert_eq!(store.status_of("a"), Some((ProbeStatus::Healthy, Some(at))));
    }

    #[test]
    fn record_after_remove_is_a_noop() {
        let store = StateStore::new();
        store.insert("a");
        store.remove("a");

        store.record("a", ProbeStatus::Healthy, Utc::now());
        assert_eq!(store.status_of("a"), None);
    }
}
