//! Error types for the ferry-common crate.

use thiserror::Error;

/// Errors raised while turning registry parameters into typed configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A parameter holds a value its consumer cannot interpret.
    #[error("Invalid value {value:?} for parameter {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(name: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
