//! Remote store configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::{require_http_url, ValidationError};
use crate::adapters::remote::HttpRemoteStoreConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,

    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RemoteConfig {
    pub fn http_config(&self) -> HttpRemoteStoreConfig {
        let config = HttpRemoteStoreConfig::new(&self.base_url)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        match self.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => config.with_api_key(key),
            None => config,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_http_url(&self.base_url, "REMOTE__BASE_URL")?;
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("remote"));
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    30
}
