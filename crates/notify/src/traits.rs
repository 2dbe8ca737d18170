//! Notifier trait definition and shared error types.

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sink rejected the announcement ({status}): {body}")]
    Sink { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// How the sink disposed of an announcement.
///
/// `Duplicate` means the sink reported this exact content as already
/// accepted, as happens after a crash between a successful send and the
/// flag persist; callers treat it exactly like `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Duplicate,
}

/// Trait for announcement sink implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one announcement through this channel.
    async fn send(&self, text: &str) -> Result<DeliveryOutcome, NotifyError>;

    /// Human-readable name for this channel (e.g., "status-post").
    fn channel_name(&self) -> &str;
}
