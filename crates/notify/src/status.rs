//! The status-post sink: a signed JSON POST per announcement.

use tracing::{debug, info, warn};

use skywatch_core::config::SinkConfig;

use crate::oauth1::Oauth1Signer;
use crate::traits::{DeliveryOutcome, Notifier, NotifyError};

/// Posts announcements as `{"text": ...}` to the configured endpoint,
/// signing each request with OAuth 1.0a.
#[derive(Debug)]
pub struct StatusNotifier {
    endpoint: String,
    signer: Oauth1Signer,
    client: reqwest::Client,
}

impl StatusNotifier {
    pub fn new(sink: &SinkConfig) -> Self {
        Self {
            endpoint: sink.endpoint.clone(),
            signer: Oauth1Signer::new(sink),
            client: reqwest::Client::new(),
        }
    }
}

/// Whether a rejection body reports the content as already delivered.
///
/// The sink flags repeats of semantically identical content; a resend
/// after a crash between send and flag-persist lands here and counts
/// as success.
fn is_duplicate_rejection(body: &str) -> bool {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));
    detail
        .unwrap_or_else(|| body.to_string())
        .to_ascii_lowercase()
        .contains("duplicate content")
}

#[async_trait::async_trait]
impl Notifier for StatusNotifier {
    async fn send(&self, text: &str) -> Result<DeliveryOutcome, NotifyError> {
        let authorization = self.signer.authorization_header("POST", &self.endpoint)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "announcement posted");
            return Ok(DeliveryOutcome::Delivered);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        if is_duplicate_rejection(&body) {
            info!(%status, "sink already has this announcement; treating as delivered");
            return Ok(DeliveryOutcome::Duplicate);
        }

        warn!(%status, body = %body, "sink rejected announcement");
        Err(NotifyError::Sink {
            status: status.as_u16(),
            body,
        })
    }

    fn channel_name(&self) -> &str {
        "status-post"
    }
}
