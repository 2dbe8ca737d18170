pub mod config;
pub mod error;
pub mod visit;

pub use config::Config;
pub use error::ConfigError;
pub use visit::Visit;
