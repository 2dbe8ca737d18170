//! HTTP client for the publisher's index page and schedule files.

use tracing::debug;
use url::Url;

use crate::error::IngestError;

/// Thin wrapper around a pooled `reqwest::Client` for schedule fetches.
#[derive(Debug)]
pub struct SourceClient {
    client: reqwest::Client,
    index_url: String,
}

impl SourceClient {
    pub fn new(index_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            index_url,
        }
    }

    /// Fetch the index page listing the published schedule files.
    pub async fn fetch_index(&self) -> Result<String, IngestError> {
        debug!(url = %self.index_url, "fetching schedule index");
        let response = self
            .client
            .get(&self.index_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// Fetch one schedule file as strict UTF-8 text.
    ///
    /// A body that is not valid UTF-8 is a fetch-level failure; the
    /// caller skips the file and moves on.
    pub async fn fetch_schedule(&self, url: &Url) -> Result<String, IngestError> {
        debug!(url = %url, "fetching schedule file");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|e| IngestError::Encoding(e.to_string()))
    }
}
