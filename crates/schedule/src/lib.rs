//! Schedule ingestion pipeline: parsing published fixed-width schedule
//! files into visits, the de-duplicated timeline store, and its CSV
//! persistence.

pub mod codec;
pub mod error;
pub mod parser;
pub mod persist;
pub mod store;

pub use error::ScheduleError;
pub use parser::parse_schedule;
pub use store::ScheduleStore;
