//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("{0} must be an http(s) url")]
    InvalidUrl(&'static str),

    #[error("{0} timeout must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("local store key prefix cannot be empty")]
    EmptyKeyPrefix,

    #[error("unknown default model '{0}'")]
    UnknownModel(String),
}

pub(super) fn require_http_url(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingRequired(field));
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ValidationError::InvalidUrl(field));
    }
    Ok(())
}
