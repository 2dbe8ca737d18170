//! The visit data model: one scheduled observation on the timeline.

use chrono::{DateTime, TimeDelta, Utc};

/// One scheduled observation, keyed by its visit identifier.
///
/// A visit is only ever constructed with a resolved start time; rows whose
/// timing cannot be resolved are dropped at parse time and never reach the
/// store. The `notified` flag starts false and, once set, never reverts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    /// Stable unique key, `<proposal-id>:<suffix>`. The suffix may itself
    /// contain colons.
    pub visit_id: String,
    /// Scheduled start of the observation window (UTC).
    pub start_time: DateTime<Utc>,
    /// Length of the observation window, non-negative.
    pub duration: TimeDelta,
    pub target_name: Option<String>,
    pub instrument_mode: Option<String>,
    pub keywords: Option<String>,
    /// Whether an announcement for this visit has been confirmed sent.
    pub notified: bool,
}

impl Visit {
    /// End of the observation window (exclusive).
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + self.duration
    }

    /// Whether `now` falls inside the half-open window
    /// `[start_time, start_time + duration)`.
    pub fn window_contains(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time()
    }

    /// Proposal number: everything before the first `:` of the visit id.
    pub fn proposal_number(&self) -> &str {
        self.visit_id.split(':').next().unwrap_or(&self.visit_id)
    }

    /// Human-readable locator within the proposal: everything after the
    /// first `:`, colons preserved.
    pub fn observation_locator(&self) -> &str {
        match self.visit_id.split_once(':') {
            Some((_, rest)) => rest,
            None => "",
        }
    }
}
