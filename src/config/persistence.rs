//! Local persistence configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Directory for the file-backed local store; no local tier when unset
    pub local_store_dir: Option<PathBuf>,

    /// Prefix of every local list key, e.g. `assistant.bookmarks`
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl PersistenceConfig {
    pub fn has_local_store(&self) -> bool {
        self.local_store_dir.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key_prefix.trim().is_empty() {
            return Err(ValidationError::EmptyKeyPrefix);
        }
        Ok(())
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            local_store_dir: None,
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_key_prefix() -> String {
    "assistant".to_string()
}
