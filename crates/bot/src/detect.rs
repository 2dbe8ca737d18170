//! The detection pass: announce every visit whose window contains now.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use skywatch_notify::format::format_announcement;
use skywatch_notify::{DeliveryOutcome, Notifier};
use skywatch_schedule::ScheduleStore;

/// Announce each un-notified visit whose observation window contains
/// `now`. Returns how many announcements were newly delivered.
///
/// A duplicate-content rejection from the sink counts as delivered;
/// that is the resend after a crash landed between the send and the
/// flag persist. Any other failure leaves the flag untouched, so the
/// visit is retried on every pass until its window closes; after that
/// it simply stops matching and ages out silently.
pub async fn detection_pass(
    store: &mut ScheduleStore,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> usize {
    let mut announced = 0;
    for visit in store.query_window(now) {
        let text = format_announcement(&visit);
        match notifier.send(&text).await {
            Ok(DeliveryOutcome::Delivered) => {
                info!(visit_id = %visit.visit_id, "announced visit");
                store.mark_notified(&visit.visit_id);
                announced += 1;
            }
            Ok(DeliveryOutcome::Duplicate) => {
                info!(visit_id = %visit.visit_id, "announcement already delivered; marking notified");
                store.mark_notified(&visit.visit_id);
            }
            Err(e) => {
                warn!(
                    visit_id = %visit.visit_id,
                    error = %e,
                    "announcement failed; retrying while the window is open"
                );
            }
        }
    }
    announced
}
