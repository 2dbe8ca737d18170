use thiserror::Error;

/// Startup-time configuration failures. These are the only errors in the
/// system that are allowed to terminate the process.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no .env file found; it must provide the sink signing credentials (SINK_CONSUMER_KEY, SINK_CONSUMER_SECRET, SINK_ACCESS_TOKEN, SINK_ACCESS_TOKEN_SECRET)")]
    MissingEnvFile,

    #[error("required environment variable not set: {0}")]
    MissingKey(&'static str),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
