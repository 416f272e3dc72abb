//! Provider Gateway Port - the single door to text generation.
//!
//! The orchestrator never talks to a model vendor directly. It hands a prompt
//! and an abstract [`TaskType`] to the gateway, which owns provider choice,
//! caching, timeouts and retries.
//!
//! # Contract
//!
//! - Latency is unbounded; callers show a pending state while awaiting.
//! - The gateway is the sole authority on response content.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::routing::TaskType;

#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Generate a response for one prompt.
    async fn invoke(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub task_type: TaskType,
    /// `"anonymous"` for unauthenticated callers.
    pub user_id: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, task_type: TaskType, user_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            task_type,
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub response_text: String,
    pub metadata: GenerationMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Which provider actually served the request.
    pub provider: String,
    pub model: Option<String>,
    pub tokens: TokenUsage,
    pub cached: bool,
}

impl GenerationMetadata {
    pub fn new(provider: impl Into<String>, tokens: TokenUsage) -> Self {
        Self {
            provider: provider.into(),
            model: None,
            tokens,
            cached: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }

    /// `"{provider} • {total} tokens"`, with `" • Cached"` for cache hits.
    pub fn summary(&self) -> String {
        let mut summary = format!("{} • {} tokens", self.provider, self.tokens.total_tokens);
        if self.cached {
            summary.push_str(" • Cached");
        }
        summary
    }
}

/// Token usage for a generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Gateway errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Rate limited by the gateway or an upstream provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    /// The gateway answered with something we could not read.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl ProviderError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Unavailable { .. }
                | ProviderError::Network(_)
                | ProviderError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_usage_totals() {
        let usage = TokenUsage::new(100, 50);
        assert_eq!(usage.total_tokens, 150);
    }

    #[test]
    fn token_usage_total_saturates() {
        let usage = TokenUsage::new(u32::MAX, 7);
        assert_eq!(usage.total_tokens, u32::MAX);
        assert_eq!(usage.completion_tokens, 7);
    }

    #[test]
    fn summary_mentions_cache_hits() {
        let meta = GenerationMetadata::new("anthropic", TokenUsage::new(10, 32));
        assert_eq!(meta.summary(), "anthropic • 42 tokens");
        assert_eq!(meta.cached(true).summary(), "anthropic • 42 tokens • Cached");
    }

    #[test]
    fn retryable_classification() {
        assert!(ProviderError::rate_limited(30).is_retryable());
        assert!(ProviderError::unavailable("down").is_retryable());
        assert!(ProviderError::network("reset").is_retryable());
        assert!(ProviderError::Timeout { timeout_secs: 120 }.is_retryable());
        assert!(!ProviderError::AuthenticationFailed.is_retryable());
        assert!(!ProviderError::parse("bad json").is_retryable());
        assert!(!ProviderError::InvalidRequest("empty".into()).is_retryable());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ProviderError::rate_limited(30).to_string(),
            "rate limited: retry after 30s"
        );
        assert_eq!(ProviderError::AuthenticationFailed.to_string(), "authentication failed");
    }
}
