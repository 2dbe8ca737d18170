//! The scheduler loop: periodic re-ingestion and persistence, plus a
//! detection pass, on independent cadences.
//!
//! One logical task drives everything; a refresh (when due) always
//! completes before the same cycle's detection pass, so freshly
//! ingested visits are visible immediately. No failure inside a cycle
//! ever breaks the loop.

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use skywatch_ingest::Ingestor;
use skywatch_notify::Notifier;
use skywatch_schedule::persist::{self, StatePaths};
use skywatch_schedule::ScheduleStore;

use crate::detect::detection_pass;

pub struct Runner {
    store: ScheduleStore,
    ingestor: Ingestor,
    notifier: Box<dyn Notifier>,
    paths: StatePaths,
    poll_interval: Duration,
    refresh_interval: Duration,
    /// None until the first refresh, which therefore runs immediately.
    last_refresh: Option<Instant>,
}

impl Runner {
    pub fn new(
        store: ScheduleStore,
        ingestor: Ingestor,
        notifier: Box<dyn Notifier>,
        paths: StatePaths,
        poll_interval: Duration,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            store,
            ingestor,
            notifier,
            paths,
            poll_interval,
            refresh_interval,
            last_refresh: None,
        }
    }

    fn refresh_due(&self) -> bool {
        match self.last_refresh {
            None => true,
            Some(at) => at.elapsed() >= self.refresh_interval,
        }
    }

    /// One ingest round plus a full state save. Failures are logged and
    /// absorbed; the next refresh simply tries again.
    async fn refresh(&mut self) {
        match self.ingestor.ingest(&mut self.store).await {
            Ok(report) => info!(
                files = report.files_ingested,
                failed = report.files_failed,
                visits_added = report.visits_added,
                timeline = self.store.len(),
                "ingest round complete"
            ),
            Err(e) => warn!(error = %e, "ingest round failed; retrying on next refresh"),
        }

        if let Err(e) = persist::save(&self.store, &self.paths) {
            warn!(error = %e, "failed to save schedule state");
        }
        self.last_refresh = Some(Instant::now());
    }

    /// Run until the process is terminated.
    pub async fn run(&mut self) {
        loop {
            if self.refresh_due() {
                self.refresh().await;
            }

            debug!("checking for visits entering their window");
            let announced = detection_pass(&mut self.store, self.notifier.as_ref(), Utc::now()).await;
            if announced > 0 {
                info!(announced, "observation announcements delivered");
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
