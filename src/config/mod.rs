//! Application configuration module
//!
//! Configuration is read from environment variables (and a `.env` file when
//! present) with the `ASSISTANT` prefix; nested values use `__` as separator.
//!
//! # Example
//!
//! ```no_run
//! use assistant_orchestrator::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod assistant;
mod error;
mod gateway;
mod logging;
mod persistence;
mod remote;

pub use assistant::AssistantConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use logging::LoggingConfig;
pub use persistence::PersistenceConfig;
pub use remote::RemoteConfig;

use serde::Deserialize;

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Generation backend
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Remote persistence service; the remote tier is skipped when absent
    pub remote: Option<RemoteConfig>,

    /// Local (device) persistence
    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `ASSISTANT__GATEWAY__BASE_URL=...` -> `gateway.base_url = ...`
    /// - `ASSISTANT__PERSISTENCE__LOCAL_STORE_DIR=...` -> `persistence.local_store_dir = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ASSISTANT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all sections.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.gateway.validate()?;
        if let Some(remote) = &self.remote {
            remote.validate()?;
        }
        self.persistence.validate()?;
        self.assistant.validate()?;
        Ok(())
    }
}
