//! HTTP Remote Store - JSON REST mapping of the remote store surface.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | conversations | `GET /users/{user}/conversations?status=` |
//! | insights | `GET /users/{user}/insights?status=` |
//! | project analyses | `GET /users/{user}/project-analyses` |
//! | stats | `GET /users/{user}/conversation-stats` |
//! | create conversation | `POST /users/{user}/conversations` |
//! | messages | `GET /conversations/{id}/messages` |
//! | rate | `PUT /messages/{id}/rating` |
//! | dismiss / implement | `POST /insights/{id}/dismiss`, `POST /insights/{id}/implement` |
//! | archive / pin | `POST /conversations/{id}/archive`, `POST /conversations/{id}/pin` |
//! | delete | `DELETE /conversations/{id}` |
//! | bookmark / reminder | `POST /users/{user}/bookmarks`, `POST /users/{user}/reminders` |

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

use crate::domain::conversation::{
    Bookmark, Conversation, ConversationFilter, ConversationPayload, ConversationStats,
    ConversationSummary, Message, Rating,
};
use crate::domain::foundation::{ConversationId, InsightId, MessageId, UserId};
use crate::domain::insight::{Insight, InsightFilter, InsightState, ProjectAnalysis, Reminder};
use crate::ports::{PersistenceError, RemoteStore};

#[derive(Debug, Clone)]
pub struct HttpRemoteStoreConfig {
    pub base_url: String,
    api_key: Option<Secret<String>>,
    pub timeout: Duration,
}

impl HttpRemoteStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct HttpRemoteStore {
    config: HttpRemoteStoreConfig,
    base: Url,
    client: Client,
}

fn insight_status(state: InsightState) -> &'static str {
    match state {
        InsightState::Active => "active",
        InsightState::Dismissed => "dismissed",
        InsightState::Implemented => "implemented",
    }
}

impl HttpRemoteStore {
    pub fn new(config: HttpRemoteStoreConfig) -> Result<Self, PersistenceError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| PersistenceError::Unavailable(format!("invalid base url: {}", e)))?;
        if base.cannot_be_a_base() {
            return Err(PersistenceError::Unavailable(format!(
                "base url cannot carry a path: {}",
                config.base_url
            )));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PersistenceError::Unavailable(format!("http client: {}", e)))?;

        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// Joins percent-encoded path segments onto the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, PersistenceError> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => PersistenceError::Unavailable(format!("unauthorized: {}", body)),
            404 => PersistenceError::NotFound(body),
            _ => PersistenceError::Remote(format!("status {}: {}", status, body)),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, PersistenceError> {
        let response = self.send(self.client.get(url)).await?;
        response
            .json()
            .await
            .map_err(|e| PersistenceError::Serialization(e.to_string()))
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, PersistenceError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(self.client.post(url).json(body)).await?;
        response
            .json()
            .await
            .map_err(|e| PersistenceError::Serialization(e.to_string()))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<(), PersistenceError> {
        self.send(builder).await.map(|_| ())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn get_conversations(
        &self,
        user_id: &UserId,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, PersistenceError> {
        let mut url = self.endpoint(&["users", user_id.as_str(), "conversations"]);
        url.query_pairs_mut().append_pair("status", filter.status.as_str());
        self.get_json(url).await
    }

    async fn get_insights(
        &self,
        user_id: &UserId,
        filter: &InsightFilter,
    ) -> Result<Vec<Insight>, PersistenceError> {
        let mut url = self.endpoint(&["users", user_id.as_str(), "insights"]);
        url.query_pairs_mut()
            .append_pair("status", insight_status(filter.status));
        self.get_json(url).await
    }

    async fn get_project_analyses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProjectAnalysis>, PersistenceError> {
        self.get_json(self.endpoint(&["users", user_id.as_str(), "project-analyses"]))
            .await
    }

    async fn get_conversation_stats(
        &self,
        user_id: &UserId,
    ) -> Result<ConversationStats, PersistenceError> {
        self.get_json(self.endpoint(&["users", user_id.as_str(), "conversation-stats"]))
            .await
    }

    async fn create_conversation(
        &self,
        user_id: &UserId,
        payload: &ConversationPayload,
    ) -> Result<ConversationSummary, PersistenceError> {
        let url = self.endpoint(&["users", user_id.as_str(), "conversations"]);
        self.post_json(url, payload).await
    }

    async fn get_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, PersistenceError> {
        self.get_json(self.endpoint(&["conversations", conversation_id.as_str(), "messages"]))
            .await
    }

    async fn rate_message(
        &self,
        message_id: &MessageId,
        rating: Rating,
    ) -> Result<(), PersistenceError> {
        let id = message_id.to_string();
        let url = self.endpoint(&["messages", id.as_str(), "rating"]);
        self.execute(self.client.put(url).json(&json!({ "rating": rating })))
            .await
    }

    async fn dismiss_insight(&self, insight_id: &InsightId) -> Result<(), PersistenceError> {
        let url = self.endpoint(&["insights", insight_id.as_str(), "dismiss"]);
        self.execute(self.client.post(url)).await
    }

    async fn implement_insight(
        &self,
        insight_id: &InsightId,
        action: &str,
    ) -> Result<(), PersistenceError> {
        let url = self.endpoint(&["insights", insight_id.as_str(), "implement"]);
        self.execute(self.client.post(url).json(&json!({ "action": action })))
            .await
    }

    async fn archive_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), PersistenceError> {
        let url = self.endpoint(&["conversations", conversation_id.as_str(), "archive"]);
        self.execute(self.client.post(url)).await
    }

    async fn toggle_pin_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), PersistenceError> {
        let url = self.endpoint(&["conversations", conversation_id.as_str(), "pin"]);
        self.execute(self.client.post(url)).await
    }

    async fn delete_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), PersistenceError> {
        let url = self.endpoint(&["conversations", conversation_id.as_str()]);
        self.execute(self.client.delete(url)).await
    }

    async fn save_bookmark(
        &self,
        user_id: &UserId,
        bookmark: &Bookmark,
    ) -> Result<(), PersistenceError> {
        let url = self.endpoint(&["users", user_id.as_str(), "bookmarks"]);
        self.execute(self.client.post(url).json(bookmark)).await
    }

    async fn save_reminder(
        &self,
        user_id: &UserId,
        reminder: &Reminder,
    ) -> Result<(), PersistenceError> {
        let url = self.endpoint(&["users", user_id.as_str(), "reminders"]);
        self.execute(self.client.post(url).json(reminder)).await
    }
}
