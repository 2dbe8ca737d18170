//! Parser for the published fixed-width schedule files.
//!
//! The files are loosely tabular text: two title lines, a header line,
//! a separator line, then one row per visit. Columns are delimited by
//! runs of two or more spaces. Rows are not guaranteed a value in every
//! column; untargeted visit types leave TARGET NAME blank, and trailing
//! fields may be missing entirely.

use tracing::{debug, warn};

use skywatch_core::Visit;

use crate::codec::{parse_duration, parse_start_time};

/// 0-based line index of the column header row.
const HEADER_LINE: usize = 2;
/// 0-based line index of the first data row.
const FIRST_DATA_LINE: usize = 4;

const VISIT_ID: &str = "VISIT ID";
const SCHEDULED_START_TIME: &str = "SCHEDULED START TIME";
const DURATION: &str = "DURATION";
const TARGET_NAME: &str = "TARGET NAME";
const INSTRUMENT_MODE: &str = "SCIENCE INSTRUMENT AND MODE";
const KEYWORDS: &str = "KEYWORDS";

/// Split a line on runs of two-or-more spaces, keeping each field's byte
/// offset. Single spaces stay inside a field, so multi-word values like
/// target names survive intact.
fn split_columns(line: &str) -> Vec<(usize, &str)> {
    let mut fields = Vec::new();
    let mut pos = 0usize;
    for piece in line.split("  ") {
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            let lead = piece.len() - piece.trim_start().len();
            fields.push((pos + lead, trimmed));
        }
        pos += piece.len() + 2;
    }
    fields
}

/// Map a row's fields onto the header's columns.
///
/// A complete row maps positionally. A short row maps each field to the
/// column whose header offset it sits under, leaving skipped columns
/// absent; fields that align with no later column fill left-to-right,
/// which right-pads rows that are merely truncated.
fn align_fields<'a>(columns: &[(usize, &str)], fields: &[(usize, &'a str)]) -> Vec<Option<&'a str>> {
    let mut assigned: Vec<Option<&'a str>> = vec![None; columns.len()];

    if fields.len() >= columns.len() {
        for (slot, (_, text)) in assigned.iter_mut().zip(fields) {
            *slot = Some(text);
        }
        return assigned;
    }

    for &(offset, text) in fields {
        let natural = columns
            .iter()
            .rposition(|&(col_offset, _)| col_offset <= offset)
            .unwrap_or(0);
        if let Some(slot) = (natural..columns.len()).find(|&i| assigned[i].is_none()) {
            assigned[slot] = Some(text);
        }
    }
    assigned
}

/// Parse one schedule file into visits, sorted by start time descending.
///
/// Rows whose start time cannot be resolved (absent, attached-to-prime,
/// or unparseable) and rows with a malformed duration are dropped
/// silently; that is expected tolerance of the upstream format, not an
/// error. An empty or header-only file yields an empty vec.
pub fn parse_schedule(text: &str) -> Vec<Visit> {
    let lines: Vec<&str> = text.lines().collect();

    let Some(header_line) = lines.get(HEADER_LINE) else {
        return Vec::new();
    };
    let columns = split_columns(header_line);
    if !columns.iter().any(|&(_, name)| name == VISIT_ID) {
        warn!("schedule header has no {VISIT_ID} column; skipping file");
        return Vec::new();
    }
    let index_of = |name: &str| columns.iter().position(|&(_, n)| n == name);
    let id_idx = index_of(VISIT_ID);
    let start_idx = index_of(SCHEDULED_START_TIME);
    let duration_idx = index_of(DURATION);
    let target_idx = index_of(TARGET_NAME);
    let instrument_idx = index_of(INSTRUMENT_MODE);
    let keywords_idx = index_of(KEYWORDS);

    let mut visits = Vec::new();
    for line in lines.iter().skip(FIRST_DATA_LINE) {
        let fields = split_columns(line);
        if fields.is_empty() {
            continue;
        }
        let row = align_fields(&columns, &fields);
        let field = |idx: Option<usize>| idx.and_then(|i| row[i]);

        let Some(visit_id) = field(id_idx) else {
            continue;
        };
        let Some(start_time) = parse_start_time(field(start_idx)) else {
            debug!(visit_id, "dropping row with unresolved start time");
            continue;
        };
        let Some(duration_text) = field(duration_idx) else {
            debug!(visit_id, "dropping row with missing duration");
            continue;
        };
        let duration = match parse_duration(duration_text) {
            Ok(d) => d,
            Err(e) => {
                debug!(visit_id, error = %e, "dropping row with malformed duration");
                continue;
            }
        };

        visits.push(Visit {
            visit_id: visit_id.to_string(),
            start_time,
            duration,
            target_name: field(target_idx).map(str::to_string),
            instrument_mode: field(instrument_idx).map(str::to_string),
            keywords: field(keywords_idx).map(str::to_string),
            notified: false,
        });
    }

    sort_descending(&mut visits);
    visits
}

/// Newest start time first, the iteration order the store maintains.
pub(crate) fn sort_descending(visits: &mut [Visit]) {
    visits.sort_by(|a, b| b.start_time.cmp(&a.start_time));
}
