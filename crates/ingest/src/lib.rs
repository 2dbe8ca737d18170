//! Ingestion of published schedule files: index-page link discovery,
//! file fetching, and the controller that merges new files into the
//! schedule store.

pub mod client;
pub mod controller;
pub mod discover;
pub mod error;

pub use controller::{IngestReport, Ingestor};
pub use error::IngestError;
