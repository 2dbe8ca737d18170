//! Parsers for the schedule's two ad-hoc textual time encodings.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::error::ScheduleError;

/// Sentinel start-time phrase meaning the row inherits its timing from the
/// immediately preceding row. Such rows are dropped rather than resolved;
/// see the module notes in DESIGN.md.
const ATTACHED_SENTINEL: &str = "ATTACHED TO PRIME";

/// Timestamp layout used throughout the published schedules.
pub const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a `D/HH:MM:SS` duration into a non-negative time span.
///
/// Fails when the slash or colon split has the wrong arity or any
/// component is not an integer.
pub fn parse_duration(text: &str) -> Result<TimeDelta, ScheduleError> {
    let malformed = || ScheduleError::MalformedDuration(text.to_string());

    let (days_part, clock_part) = text.split_once('/').ok_or_else(malformed)?;
    if clock_part.contains('/') {
        return Err(malformed());
    }

    let days: i64 = days_part.trim().parse().map_err(|_| malformed())?;

    let mut clock = clock_part.split(':');
    let (hours, minutes, seconds) = match (clock.next(), clock.next(), clock.next(), clock.next()) {
        (Some(h), Some(m), Some(s), None) => {
            let hours: i64 = h.trim().parse().map_err(|_| malformed())?;
            let minutes: i64 = m.trim().parse().map_err(|_| malformed())?;
            let seconds: i64 = s.trim().parse().map_err(|_| malformed())?;
            (hours, minutes, seconds)
        }
        _ => return Err(malformed()),
    };

    let total_seconds = days
        .checked_mul(86_400)
        .and_then(|acc| hours.checked_mul(3_600).and_then(|h| acc.checked_add(h)))
        .and_then(|acc| minutes.checked_mul(60).and_then(|m| acc.checked_add(m)))
        .and_then(|acc| acc.checked_add(seconds))
        .filter(|total| *total >= 0)
        .ok_or_else(malformed)?;

    TimeDelta::try_seconds(total_seconds).ok_or_else(malformed)
}

/// Resolve a scheduled start time.
///
/// Returns `None` for an absent value, for the "attached to prime"
/// sentinel, and for text that does not parse as `YYYY-MM-DDTHH:MM:SSZ`.
/// Callers must treat `None` as "drop this row", not as an error.
pub fn parse_start_time(text: Option<&str>) -> Option<DateTime<Utc>> {
    let text = text?.trim();
    if text.is_empty() || text.contains(ATTACHED_SENTINEL) {
        return None;
    }

    NaiveDateTime::parse_from_str(text, START_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
