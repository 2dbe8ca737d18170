//! Announcement text for a visit entering its observation window.

use chrono::TimeDelta;

use skywatch_core::Visit;

/// Where the public proposal documents live; the proposal number from
/// the visit id is appended as `<number>.pdf`.
const PROPOSAL_ROOT: &str = "https://www.stsci.edu/jwst/phase2-public/";

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Humanize a duration as a days/hours/minutes phrase.
///
/// Zero-valued components are omitted unless everything is zero, and
/// seconds never appear: `0/02:30:45` reads "2 hours and 30 minutes".
pub fn humanize_duration(span: TimeDelta) -> String {
    let total_seconds = span.num_seconds().max(0);
    let days = total_seconds / 86_400;
    let hours = total_seconds % 86_400 / 3_600;
    let minutes = total_seconds % 3_600 / 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(plural(minutes, "minute"));
    }

    match parts.len() {
        0 => "0 minutes".to_string(),
        1 => parts.remove(0),
        2 => format!("{} and {}", parts[0], parts[1]),
        _ => format!("{}, {} and {}", parts[0], parts[1], parts[2]),
    }
}

/// Build the announcement text for one visit.
pub fn format_announcement(visit: &Visit) -> String {
    let target = visit.target_name.as_deref().unwrap_or("unknown");
    let instrument = visit.instrument_mode.as_deref().unwrap_or("unknown");
    let keywords = visit.keywords.as_deref().unwrap_or("unknown");
    let duration = humanize_duration(visit.duration);

    let mut text = format!(
        "I am now observing {target} using {instrument} for {duration}. \
         Keywords: {keywords}. \
         Proposal: {PROPOSAL_ROOT}{}.pdf",
        visit.proposal_number(),
    );
    let locator = visit.observation_locator();
    if !locator.is_empty() {
        text.push(' ');
        text.push_str(locator);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn humanize_drops_seconds() {
        let span = TimeDelta::hours(2) + TimeDelta::minutes(30) + TimeDelta::seconds(45);
        assert_eq!(humanize_duration(span), "2 hours and 30 minutes");
    }

    #[test]
    fn humanize_omits_zero_components() {
        assert_eq!(humanize_duration(TimeDelta::minutes(7)), "7 minutes");
        assert_eq!(humanize_duration(TimeDelta::hours(3)), "3 hours");
        assert_eq!(humanize_duration(TimeDelta::days(2)), "2 days");
        assert_eq!(
            humanize_duration(TimeDelta::days(1) + TimeDelta::minutes(5)),
            "1 day and 5 minutes"
        );
        assert_eq!(
            humanize_duration(TimeDelta::days(2) + TimeDelta::hours(3) + TimeDelta::minutes(4)),
            "2 days, 3 hours and 4 minutes"
        );
    }

    #[test]
    fn humanize_all_zero_reads_zero_minutes() {
        assert_eq!(humanize_duration(TimeDelta::zero()), "0 minutes");
        assert_eq!(humanize_duration(TimeDelta::seconds(59)), "0 minutes");
    }

    #[test]
    fn humanize_singular_units() {
        assert_eq!(
            humanize_duration(TimeDelta::days(1) + TimeDelta::hours(1) + TimeDelta::minutes(1)),
            "1 day, 1 hour and 1 minute"
        );
    }

    fn sample_visit() -> Visit {
        Visit {
            visit_id: "1234:5:1".to_string(),
            start_time: Utc.with_ymd_and_hms(2022, 7, 14, 10, 30, 0).unwrap(),
            duration: TimeDelta::hours(2) + TimeDelta::minutes(30) + TimeDelta::seconds(45),
            target_name: Some("NGC-1365".to_string()),
            instrument_mode: Some("NIRCam Imaging".to_string()),
            keywords: Some("Galaxies".to_string()),
            notified: false,
        }
    }

    #[test]
    fn announcement_interpolates_all_fields() {
        let text = format_announcement(&sample_visit());
        assert_eq!(
            text,
            "I am now observing NGC-1365 using NIRCam Imaging for 2 hours and 30 minutes. \
             Keywords: Galaxies. \
             Proposal: https://www.stsci.edu/jwst/phase2-public/1234.pdf 5:1"
        );
    }

    #[test]
    fn announcement_handles_absent_fields() {
        let mut visit = sample_visit();
        visit.target_name = None;
        visit.instrument_mode = None;
        visit.keywords = None;
        let text = format_announcement(&visit);
        assert!(text.starts_with("I am now observing unknown using unknown"));
        assert!(text.contains("Keywords: unknown."));
    }

    #[test]
    fn announcement_without_locator_has_no_trailing_space() {
        let mut visit = sample_visit();
        visit.visit_id = "1234".to_string();
        let text = format_announcement(&visit);
        assert!(text.ends_with("1234.pdf"));
    }
}
