//! Provider gateway configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::{require_http_url, ValidationError};
use crate::adapters::gateway::HttpGatewayConfig;

/// Where generation requests go
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the generation backend; requests go to `{base_url}/chat`
    #[serde(default)]
    pub base_url: String,

    /// Bearer token, if the backend wants one
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries for retryable failures, inside the gateway
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn http_config(&self) -> HttpGatewayConfig {
        let config = HttpGatewayConfig::new(&self.base_url)
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries);
        match self.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => config.with_api_key(key),
            None => config,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_http_url(&self.base_url, "GATEWAY__BASE_URL")?;
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("gateway"));
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    3
}
