//! CSV persistence for the schedule store.
//!
//! Two files: a tabular timeline keyed by visit id, and a single-line
//! comma-joined list of ingested source files. Both are rewritten in
//! full on every save via temp-file-and-rename, and read back at
//! startup. A missing file means a fresh start; an unreadable one is
//! logged and treated as empty rather than crashing the bot, and a
//! malformed row is skipped.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{info, warn};

use skywatch_core::Visit;

use crate::codec::START_TIME_FORMAT;
use crate::error::ScheduleError;
use crate::store::ScheduleStore;

const SCHEDULE_FILE: &str = "schedule.csv";
const SEEN_FILE: &str = "seen_files.csv";

const HEADERS: [&str; 7] = [
    "visit id",
    "start time",
    "duration secs",
    "target name",
    "instrument mode",
    "keywords",
    "notified",
];

/// Locations of the two persisted state files.
#[derive(Debug, Clone)]
pub struct StatePaths {
    pub schedule: PathBuf,
    pub seen: PathBuf,
}

impl StatePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            schedule: dir.join(SCHEDULE_FILE),
            seen: dir.join(SEEN_FILE),
        }
    }
}

/// Write the full store state to disk.
pub fn save(store: &ScheduleStore, paths: &StatePaths) -> Result<(), ScheduleError> {
    if let Some(parent) = paths.schedule.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = paths.schedule.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)?;
        writer.write_record(HEADERS)?;
        for visit in store.visits() {
            writer.write_record([
                visit.visit_id.as_str(),
                &visit.start_time.format(START_TIME_FORMAT).to_string(),
                &visit.duration.num_seconds().to_string(),
                visit.target_name.as_deref().unwrap_or(""),
                visit.instrument_mode.as_deref().unwrap_or(""),
                visit.keywords.as_deref().unwrap_or(""),
                if visit.notified { "true" } else { "false" },
            ])?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, &paths.schedule)?;

    let seen_tmp = paths.seen.with_extension("csv.tmp");
    let joined: Vec<&str> = store.seen_files().iter().map(String::as_str).collect();
    fs::write(&seen_tmp, joined.join(","))?;
    fs::rename(&seen_tmp, &paths.seen)?;

    info!(
        visits = store.len(),
        seen_files = store.seen_count(),
        path = %paths.schedule.display(),
        "schedule state saved"
    );
    Ok(())
}

/// Restore the store from disk.
///
/// Never fails: missing files start empty, unreadable files are logged
/// and treated as empty, malformed rows are skipped. Restored state is
/// exact otherwise: notified flags, times to the second, and the full
/// seen-file set all survive the round trip.
pub fn load(paths: &StatePaths) -> ScheduleStore {
    let visits = match load_visits(&paths.schedule) {
        Ok(visits) => visits,
        Err(e) => {
            warn!(
                path = %paths.schedule.display(),
                error = %e,
                "could not read persisted timeline; starting empty"
            );
            Vec::new()
        }
    };
    let seen_files = match load_seen(&paths.seen) {
        Ok(seen) => seen,
        Err(e) => {
            warn!(
                path = %paths.seen.display(),
                error = %e,
                "could not read seen-file list; starting empty"
            );
            BTreeSet::new()
        }
    };

    if !visits.is_empty() || !seen_files.is_empty() {
        info!(
            visits = visits.len(),
            seen_files = seen_files.len(),
            "restored schedule state from disk"
        );
    }
    ScheduleStore::from_parts(visits, seen_files)
}

fn load_visits(path: &Path) -> Result<Vec<Visit>, ScheduleError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut visits = Vec::new();
    for record in reader.records() {
        let record = record?;
        match parse_record(&record) {
            Some(visit) => visits.push(visit),
            None => warn!(row = ?record, "skipping malformed timeline row"),
        }
    }
    Ok(visits)
}

fn parse_record(record: &csv::StringRecord) -> Option<Visit> {
    let field = |i: usize| record.get(i).map(str::trim);
    let optional = |i: usize| field(i).filter(|s| !s.is_empty()).map(str::to_string);

    let visit_id = field(0)?.to_string();
    if visit_id.is_empty() {
        return None;
    }
    let start_time = NaiveDateTime::parse_from_str(field(1)?, START_TIME_FORMAT)
        .ok()?
        .and_utc();
    let duration = TimeDelta::try_seconds(field(2)?.parse().ok()?)
        .filter(|d| *d >= TimeDelta::zero())?;

    Some(Visit {
        visit_id,
        start_time,
        duration,
        target_name: optional(3),
        instrument_mode: optional(4),
        keywords: optional(5),
        notified: field(6)? == "true",
    })
}

fn load_seen(path: &Path) -> Result<BTreeSet<String>, ScheduleError> {
    if !path.exists() {
        return Ok(BTreeSet::new());
    }
    let text = fs::read_to_string(path)?;
    Ok(text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_store() -> ScheduleStore {
        let mut store = ScheduleStore::new();
        store.merge(vec![
            Visit {
                visit_id: "1234:5:1".to_string(),
                start_time: Utc.with_ymd_and_hms(2022, 7, 14, 10, 30, 0).unwrap(),
                duration: TimeDelta::seconds(2 * 3600 + 30 * 60 + 45),
                target_name: Some("NGC-1365".to_string()),
                instrument_mode: Some("NIRCam Imaging".to_string()),
                keywords: Some("Galaxies".to_string()),
                notified: false,
            },
            Visit {
                visit_id: "1235:1:1".to_string(),
                start_time: Utc.with_ymd_and_hms(2022, 7, 15, 1, 0, 0).unwrap(),
                duration: TimeDelta::days(1),
                target_name: None,
                instrument_mode: None,
                keywords: None,
                notified: false,
            },
        ]);
        store.mark_notified("1235:1:1");
        store.mark_source_seen("schedule_20220711.txt");
        store.mark_source_seen("schedule_20220704.txt");
        store
    }

    #[test]
    fn save_then_load_round_trips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::in_dir(dir.path());
        let store = sample_store();

        save(&store, &paths).unwrap();
        let restored = load(&paths);

        assert_eq!(restored.visits(), store.visits());
        assert_eq!(restored.seen_files(), store.seen_files());

        let notified: Vec<bool> = restored.visits().iter().map(|v| v.notified).collect();
        assert_eq!(notified, vec![true, false]);
    }

    #[test]
    fn load_missing_files_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::in_dir(dir.path());
        let store = load(&paths);
        assert!(store.is_empty());
        assert_eq!(store.seen_count(), 0);
    }

    #[test]
    fn load_skips_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::in_dir(dir.path());
        fs::write(
            &paths.schedule,
            "visit id,start time,duration secs,target name,instrument mode,keywords,notified\n\
             1234:5:1,2022-07-14T10:30:00Z,9045,NGC-1365,NIRCam Imaging,Galaxies,false\n\
             9999:1:1,not-a-timestamp,60,,,,false\n\
             8888:1:1,2022-07-16T00:00:00Z,not-a-number,,,,false\n",
        )
        .unwrap();

        let store = load(&paths);
        assert_eq!(store.len(), 1);
        assert_eq!(store.visits()[0].visit_id, "1234:5:1");
    }

    #[test]
    fn load_garbage_timeline_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::in_dir(dir.path());
        fs::write(&paths.schedule, "visit id\n\"unterminated\n").unwrap();

        let store = load(&paths);
        assert!(store.is_empty());
    }

    #[test]
    fn empty_seen_file_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::in_dir(dir.path());
        fs::write(&paths.seen, "").unwrap();
        assert_eq!(load(&paths).seen_count(), 0);
    }

    #[test]
    fn resave_after_mutation_persists_new_flags() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::in_dir(dir.path());
        let mut store = sample_store();
        save(&store, &paths).unwrap();

        store.mark_notified("1234:5:1");
        store.mark_source_seen("schedule_20220718.txt");
        save(&store, &paths).unwrap();

        let restored = load(&paths);
        assert!(restored.visits().iter().all(|v| v.notified));
        assert_eq!(restored.seen_count(), 3);
    }
}
