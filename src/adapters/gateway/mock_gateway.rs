//! Mock Provider Gateway for testing.
//!
//! Scripted replies are consumed in order; once the script runs out every call
//! gets a default reply. Calls are recorded for verification.
//!
//! # Example
//!
//! ```ignore
//! let gateway = MockProviderGateway::new()
//!     .with_response("Here is your analysis")
//!     .with_error(ProviderError::unavailable("overloaded"));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    GenerationMetadata, GenerationRequest, GenerationResponse, ProviderError, ProviderGateway,
    TokenUsage,
};

#[derive(Debug, Clone)]
enum MockReply {
    Success(GenerationResponse),
    Error(ProviderError),
}

/// Mock gateway with scripted replies, optional latency and a call log.
#[derive(Debug, Clone)]
pub struct MockProviderGateway {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl Default for MockProviderGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProviderGateway {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful reply from the "mock" provider.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_response_full(text, GenerationMetadata::new("mock", TokenUsage::new(12, 30)))
    }

    /// Queues a successful reply with explicit metadata.
    pub fn with_response_full(self, text: impl Into<String>, metadata: GenerationMetadata) -> Self {
        lock(&self.replies).push_back(MockReply::Success(GenerationResponse {
            response_text: text.into(),
            metadata,
        }));
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: ProviderError) -> Self {
        lock(&self.replies).push_back(MockReply::Error(error));
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        lock(&self.calls).clone()
    }

    pub fn last_call(&self) -> Option<GenerationRequest> {
        lock(&self.calls).last().cloned()
    }

    fn next_reply(&self) -> MockReply {
        lock(&self.replies).pop_front().unwrap_or_else(|| {
            MockReply::Success(GenerationResponse {
                response_text: "Mock response".to_string(),
                metadata: GenerationMetadata::new("mock", TokenUsage::new(5, 10)),
            })
        })
    }
}

#[async_trait]
impl ProviderGateway for MockProviderGateway {
    async fn invoke(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_reply() {
            MockReply::Success(response) => Ok(response),
            MockReply::Error(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::routing::TaskType;

    fn request() -> GenerationRequest {
        GenerationRequest::new("hi", TaskType::Chat, "anonymous")
    }

    #[tokio::test]
    async fn replies_in_order_then_default() {
        let gateway = MockProviderGateway::new()
            .with_response("first")
            .with_error(ProviderError::AuthenticationFailed);

        assert_eq!(gateway.invoke(request()).await.unwrap().response_text, "first");
        assert_eq!(
            gateway.invoke(request()).await.unwrap_err(),
            ProviderError::AuthenticationFailed
        );
        assert_eq!(gateway.invoke(request()).await.unwrap().response_text, "Mock response");
    }

    #[tokio::test]
    async fn records_calls() {
        let gateway = MockProviderGateway::new();
        gateway
            .invoke(GenerationRequest::new("plan", TaskType::Strategic, "u-1"))
            .await
            .unwrap();
        assert_eq!(gateway.call_count(), 1);
        let call = gateway.last_call().unwrap();
        assert_eq!(call.task_type, TaskType::Strategic);
        assert_eq!(call.user_id, "u-1");
    }

    #[tokio::test]
    async fn clones_share_the_script() {
        let gateway = MockProviderGateway::new().with_response("shared");
        let clone = gateway.clone();
        assert_eq!(clone.invoke(request()).await.unwrap().response_text, "shared");
        assert_eq!(gateway.call_count(), 1);
    }
}
