//! The ingestion controller: discovers newly published schedule files
//! and merges them into the store.

use tracing::{info, warn};

use skywatch_core::config::SourceConfig;
use skywatch_schedule::{parse_schedule, ScheduleStore};

use crate::client::SourceClient;
use crate::discover::discover_schedule_links;
use crate::error::IngestError;

/// What one ingest round accomplished, for the loop's logs.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files_ingested: usize,
    pub files_failed: usize,
    pub visits_added: usize,
}

pub struct Ingestor {
    client: SourceClient,
    source: SourceConfig,
}

impl Ingestor {
    pub fn new(source: SourceConfig) -> Self {
        Self {
            client: SourceClient::new(source.index_url.clone()),
            source,
        }
    }

    /// Run one ingest round.
    ///
    /// Every candidate file is first marked seen; only the first marking
    /// fetches and parses it. A file that fails to fetch or decode is
    /// logged and skipped without aborting the remaining candidates;
    /// having been marked, it is not retried on later rounds. Only an
    /// index-page failure abandons the round as a whole.
    pub async fn ingest(&self, store: &mut ScheduleStore) -> Result<IngestReport, IngestError> {
        let html = self.client.fetch_index().await?;
        let sources =
            discover_schedule_links(&html, &self.source.base_url, &self.source.link_prefix)?;

        let mut report = IngestReport::default();
        for source in sources {
            if !store.mark_source_seen(&source.file_id) {
                continue;
            }
            info!(file = %source.file_id, url = %source.url, "processing schedule file");
            match self.client.fetch_schedule(&source.url).await {
                Ok(text) => {
                    let added = merge_schedule_text(store, &text);
                    report.files_ingested += 1;
                    report.visits_added += added;
                    info!(file = %source.file_id, added, "merged schedule file");
                }
                Err(e) => {
                    warn!(file = %source.file_id, error = %e, "failed to ingest schedule file; skipping");
                    report.files_failed += 1;
                }
            }
        }
        Ok(report)
    }
}

/// Parse one schedule file body and merge it into the store.
///
/// Returns the number of visits actually inserted (first write wins for
/// ids the store already knows).
pub fn merge_schedule_text(store: &mut ScheduleStore, text: &str) -> usize {
    store.merge(parse_schedule(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const WEEK_ONE: &str = "\
TITLE
PACKAGE

VISIT ID  SCHEDULED START TIME  DURATION    TARGET NAME
--------  --------------------  ----------  -----------
1234:1:1  2022-07-14T10:30:00Z  0/01:00:00  NGC-1365
1234:2:1  2022-07-14T12:00:00Z  0/02:00:00  NGC-1365
";

    const WEEK_TWO_OVERLAPPING: &str = "\
TITLE
PACKAGE

VISIT ID  SCHEDULED START TIME  DURATION    TARGET NAME
--------  --------------------  ----------  -----------
1234:2:1  2022-07-14T12:00:00Z  0/02:00:00  RENAMED
1250:1:1  2022-07-21T08:00:00Z  0/03:00:00  TRAPPIST-1
";

    #[test]
    fn merge_schedule_text_inserts_parsed_rows() {
        let mut store = ScheduleStore::new();
        assert_eq!(merge_schedule_text(&mut store, WEEK_ONE), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn overlapping_file_keeps_first_write() {
        let mut store = ScheduleStore::new();
        merge_schedule_text(&mut store, WEEK_ONE);
        assert_eq!(merge_schedule_text(&mut store, WEEK_TWO_OVERLAPPING), 1);

        let kept = store
            .visits()
            .iter()
            .find(|v| v.visit_id == "1234:2:1")
            .unwrap();
        assert_eq!(kept.target_name.as_deref(), Some("NGC-1365"));
        assert_eq!(
            store.visits()[0].start_time,
            Utc.with_ymd_and_hms(2022, 7, 21, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn seen_file_is_not_reprocessed() {
        let mut store = ScheduleStore::new();
        assert!(store.mark_source_seen("schedule_20220711.txt"));
        merge_schedule_text(&mut store, WEEK_ONE);

        // A second round sees the same candidate and skips it before any
        // fetch happens.
        assert!(!store.mark_source_seen("schedule_20220711.txt"));
    }
}
