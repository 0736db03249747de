//! Shared plumbing for the ferry MTA: logging, SMTP reply status codes and
//! access to the configuration-parameter registry.

pub mod config;
pub mod error;
pub mod logging;
pub mod status;

pub use error::ConfigError;
pub use status::Status;
pub use tracing;
