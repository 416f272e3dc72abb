//! HTTP Provider Gateway - posts prompts to the generation service.
//!
//! # Wire format
//!
//! `POST {base_url}/chat` with body `{"prompt", "taskType", "userId"}`; the
//! service answers `{"response", "metadata": {"provider", "model",
//! "tokens": {"prompt", "completion", "total"}, "cached"}}`.
//!
//! Retryable failures are retried with exponential backoff (1s, 2s, 4s, ...)
//! up to `max_retries`.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::routing::TaskType;
use crate::ports::{
    GenerationMetadata, GenerationRequest, GenerationResponse, ProviderError, ProviderGateway,
    TokenUsage,
};

/// Retry-after used when a 429 carries no usable header.
const DEFAULT_RETRY_AFTER_SECS: u32 = 30;
const MAX_BACKOFF_SECS: u64 = 60;

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    api_key: Option<Secret<String>>,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl HttpGatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }

    /// Sets the bearer token sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequestBody<'a> {
    prompt: &'a str,
    task_type: TaskType,
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    response: String,
    metadata: WireMetadata,
}

#[derive(Debug, Deserialize)]
struct WireMetadata {
    provider: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    tokens: WireTokens,
    #[serde(default)]
    cached: bool,
}

#[derive(Debug, Default, Deserialize)]
struct WireTokens {
    #[serde(default)]
    prompt: u32,
    #[serde(default)]
    completion: u32,
    #[serde(default)]
    total: Option<u32>,
}

impl From<ChatResponseBody> for GenerationResponse {
    fn from(body: ChatResponseBody) -> Self {
        let tokens = body.metadata.tokens;
        let mut usage = TokenUsage::new(tokens.prompt, tokens.completion);
        if let Some(total) = tokens.total {
            usage.total_tokens = total;
        }
        let mut metadata = GenerationMetadata::new(body.metadata.provider, usage)
            .cached(body.metadata.cached);
        metadata.model = body.metadata.model;
        GenerationResponse {
            response_text: body.response,
            metadata,
        }
    }
}

/// Maps a non-success status to a gateway error.
fn classify_status(status: StatusCode, body: String, retry_after: Option<u32>) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationFailed,
        429 => ProviderError::rate_limited(retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS)),
        400 | 422 => ProviderError::InvalidRequest(body),
        408 | 504 => ProviderError::unavailable(format!("gateway timeout {}: {}", status, body)),
        500..=599 => ProviderError::unavailable(format!("server error {}: {}", status, body)),
        _ => ProviderError::network(format!("unexpected status {}: {}", status, body)),
    }
}

/// Generation gateway reached over HTTP.
pub struct HttpProviderGateway {
    config: HttpGatewayConfig,
    client: Client,
}

impl HttpProviderGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::InvalidRequest(format!("http client: {}", e)))?;

        Ok(Self { config, client })
    }

    async fn send(&self, request: &GenerationRequest) -> Result<Response, ProviderError> {
        let body = ChatRequestBody {
            prompt: &request.prompt,
            task_type: request.task_type,
            user_id: &request.user_id,
        };

        let mut builder = self.client.post(self.config.chat_url()).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    timeout_secs: self.config.timeout.as_secs() as u32,
                }
            } else if e.is_connect() {
                ProviderError::network(format!("connection failed: {}", e))
            } else {
                ProviderError::network(e.to_string())
            }
        })
    }

    async fn parse(&self, response: Response) -> Result<GenerationResponse, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body, retry_after));
        }

        let body: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| ProviderError::parse(format!("failed to parse response: {}", e)))?;
        Ok(body.into())
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let response = self.send(request).await?;
        self.parse(response).await
    }
}

/// Exponential backoff (1s, 2s, 4s, ...) capped at [`MAX_BACKOFF_SECS`].
fn backoff_delay(retry_count: u32) -> Duration {
    let secs = 1u64.checked_shl(retry_count).unwrap_or(u64::MAX);
    Duration::from_secs(secs.min(MAX_BACKOFF_SECS))
}

#[async_trait]
impl ProviderGateway for HttpProviderGateway {
    async fn invoke(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let mut retry_count = 0;

        loop {
            match self.attempt(&request).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    let delay = backoff_delay(retry_count);
                    tracing::warn!(
                        error = %err,
                        attempt = retry_count + 1,
                        delay_secs = delay.as_secs(),
                        "gateway call failed, retrying"
                    );
                    sleep(delay).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
