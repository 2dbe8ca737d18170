//! Schedule-file link discovery on the publisher's index page.

use scraper::{Html, Selector};
use tracing::{debug, error};
use url::Url;

use crate::error::IngestError;

/// One schedule file advertised on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSource {
    /// Basename of the file, used as its seen-marker identity.
    pub file_id: String,
    /// Absolute URL to fetch the file from.
    pub url: Url,
}

/// Extract schedule-file links from the index page markup.
///
/// Keeps every anchor whose `href` contains `link_prefix`, resolving
/// relative hrefs against `base_url`. Anchors that fail to resolve or
/// have no usable basename are skipped individually; they never abort
/// the scan.
pub fn discover_schedule_links(
    html: &str,
    base_url: &str,
    link_prefix: &str,
) -> Result<Vec<ScheduleSource>, IngestError> {
    let base = Url::parse(base_url)?;
    let document = Html::parse_document(html);
    let anchor = match Selector::parse("a") {
        Ok(selector) => selector,
        Err(e) => {
            // Unreachable for a literal tag selector, but don't panic the
            // ingest loop over it.
            error!(error = %e, "anchor selector failed to parse");
            return Ok(Vec::new());
        }
    };

    let mut sources = Vec::new();
    for element in document.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !href.contains(link_prefix) {
            continue;
        }
        let url = match base.join(href) {
            Ok(url) => url,
            Err(e) => {
                debug!(href, error = %e, "skipping unresolvable schedule link");
                continue;
            }
        };
        let Some(file_id) = basename(&url) else {
            debug!(href, "skipping schedule link with no basename");
            continue;
        };
        sources.push(ScheduleSource { file_id, url });
    }
    Ok(sources)
}

/// Last path segment of the URL, the file's identity in the seen set.
fn basename(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(str::to_string)
}
