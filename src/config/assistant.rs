//! Assistant behavior configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::ReconciliationPolicy;
use crate::domain::routing::TaskRouter;

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Model selected when a session starts
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Base of public share links
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,

    /// What happens to optimistic changes whose write failed everywhere
    #[serde(default)]
    pub reconciliation: ReconciliationPolicy,
}

impl AssistantConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !TaskRouter::default().is_known(&self.default_model) {
            return Err(ValidationError::UnknownModel(self.default_model.clone()));
        }
        super::error::require_http_url(&self.share_base_url, "ASSISTANT__SHARE_BASE_URL")
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            share_base_url: default_share_base_url(),
            reconciliation: ReconciliationPolicy::default(),
        }
    }
}

fn default_model() -> String {
    "anthropic".to_string()
}

fn default_share_base_url() -> String {
    "http://localhost:3000".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = AssistantConfig::default();
        assert_eq!(config.default_model, "anthropic");
        assert_eq!(config.reconciliation, ReconciliationPolicy::KeepOptimistic);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_model_is_rejected() {
        let config = AssistantConfig {
            default_model: "mistral".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::UnknownModel("mistral".to_string()))
        );
    }
}
