//! The schedule store: sole owner of the visit timeline and the set of
//! already-ingested source files.
//!
//! All mutation goes through `merge`, `mark_source_seen`, and
//! `mark_notified`; callers never touch the collections directly. The
//! bot runs a single logical task, so the store needs no locking; if
//! ingestion and detection ever become concurrent, synchronization
//! belongs at this interface.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use skywatch_core::Visit;

use crate::parser::sort_descending;

#[derive(Debug, Default)]
pub struct ScheduleStore {
    /// Timeline, kept sorted by start time descending.
    visits: Vec<Visit>,
    /// Basenames of schedule files already ingested. Membership is
    /// monotone: once a file is marked it is never fetched again, even
    /// if its upstream content changes.
    seen_files: BTreeSet<String>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted parts (restores sort order).
    pub fn from_parts(mut visits: Vec<Visit>, seen_files: BTreeSet<String>) -> Self {
        sort_descending(&mut visits);
        Self { visits, seen_files }
    }

    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn seen_files(&self) -> &BTreeSet<String> {
        &self.seen_files
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    pub fn seen_count(&self) -> usize {
        self.seen_files.len()
    }

    /// Merge newly parsed visits into the timeline.
    ///
    /// First write wins: a visit whose id is already stored is discarded,
    /// so re-parsing overlapping schedule files never duplicates a visit
    /// or resets its notified flag. Returns the number inserted.
    pub fn merge(&mut self, new_visits: Vec<Visit>) -> usize {
        let mut inserted = 0;
        for visit in new_visits {
            if self.visits.iter().any(|v| v.visit_id == visit.visit_id) {
                debug!(visit_id = %visit.visit_id, "visit already known; keeping stored entry");
                continue;
            }
            self.visits.push(visit);
            inserted += 1;
        }
        if inserted > 0 {
            sort_descending(&mut self.visits);
        }
        inserted
    }

    /// Record that a source file has been ingested.
    ///
    /// Returns true the first time a file id is seen, signaling the
    /// caller to fetch and parse it; false thereafter.
    pub fn mark_source_seen(&mut self, file_id: &str) -> bool {
        self.seen_files.insert(file_id.to_string())
    }

    /// Every un-notified visit whose observation window contains `now`.
    ///
    /// Full scan by design; the timeline is small and there is no retry
    /// bookkeeping beyond the notified flag, so every match must be
    /// yielded each cycle.
    pub fn query_window(&self, now: DateTime<Utc>) -> Vec<Visit> {
        self.visits
            .iter()
            .filter(|v| !v.notified && v.window_contains(now))
            .cloned()
            .collect()
    }

    /// Flip a visit's notified flag. Idempotent; unknown ids are a no-op.
    pub fn mark_notified(&mut self, visit_id: &str) {
        if let Some(visit) = self.visits.iter_mut().find(|v| v.visit_id == visit_id) {
            visit.notified = true;
        }
    }
}
