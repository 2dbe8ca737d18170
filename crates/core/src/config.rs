use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load the `.env` file next to the process working directory.
///
/// Unlike a plain `dotenv().ok()`, a missing file is a hard error here:
/// the sink credentials only ever arrive through it, and running without
/// them would poll forever while every notification fails.
pub fn load_dotenv() -> Result<PathBuf, ConfigError> {
    dotenvy::dotenv().map_err(|_| ConfigError::MissingEnvFile)
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_required(key: &'static str) -> Result<String, ConfigError> {
    env_opt(key).ok_or(ConfigError::MissingKey(key))
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub sink: SinkConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            source: SourceConfig::from_env(),
            sink: SinkConfig::from_env()?,
            storage: StorageConfig::from_env(),
        })
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  source:   index={}", self.source.index_url);
        tracing::info!("  source:   prefix={}", self.source.link_prefix);
        tracing::info!("  sink:     endpoint={}", self.sink.endpoint);
        tracing::info!("  sink:     consumer_key={}…", redact(&self.sink.consumer_key));
        tracing::info!("  storage:  data_dir={}", self.storage.data_dir.display());
    }
}

fn redact(secret: &str) -> String {
    secret.chars().take(4).collect()
}

// ── Schedule source ───────────────────────────────────────────

/// Where schedule files are published and how their links are recognized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Index page listing the published schedule files.
    pub index_url: String,
    /// Base URL that relative schedule links resolve against.
    pub base_url: String,
    /// Path fragment identifying a schedule-file link on the index page.
    pub link_prefix: String,
}

impl SourceConfig {
    fn from_env() -> Self {
        Self {
            index_url: env_or(
                "SCHEDULE_INDEX_URL",
                "https://www.stsci.edu/jwst/science-execution/observing-schedules",
            ),
            base_url: env_or("SCHEDULE_BASE_URL", "https://www.stsci.edu"),
            link_prefix: env_or("SCHEDULE_LINK_PREFIX", "/files/live/sites/www"),
        }
    }
}

// ── Notification sink ─────────────────────────────────────────

/// Endpoint and OAuth 1.0a credentials for the notification sink.
///
/// All four secrets are required; the process refuses to start without
/// them rather than discovering the gap on the first send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    pub endpoint: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl SinkConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: env_or("SINK_ENDPOINT", "https://api.twitter.com/2/tweets"),
            consumer_key: env_required("SINK_CONSUMER_KEY")?,
            consumer_secret: env_required("SINK_CONSUMER_SECRET")?,
            access_token: env_required("SINK_ACCESS_TOKEN")?,
            access_token_secret: env_required("SINK_ACCESS_TOKEN_SECRET")?,
        })
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persisted timeline and seen-file state.
    pub data_dir: PathBuf,
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
        }
    }
}
