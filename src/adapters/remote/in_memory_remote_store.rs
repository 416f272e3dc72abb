//! In-memory Remote Store for tests and local development.
//!
//! Seedable with conversations, insights, analyses and messages, and able to
//! fail any individual operation on demand.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::conversation::{
    Bookmark, Conversation, ConversationFilter, ConversationPayload, ConversationStats,
    ConversationSummary, Message, Rating,
};
use crate::domain::foundation::{ConversationId, InsightId, MessageId, Timestamp, UserId};
use crate::domain::insight::{Insight, InsightFilter, InsightState, ProjectAnalysis, Reminder};
use crate::ports::{PersistenceError, RemoteStore};

/// Names each remote operation for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    GetConversations,
    GetInsights,
    GetProjectAnalyses,
    GetConversationStats,
    CreateConversation,
    GetMessages,
    RateMessage,
    DismissInsight,
    ImplementInsight,
    ArchiveConversation,
    TogglePinConversation,
    DeleteConversation,
    SaveBookmark,
    SaveReminder,
}

impl RemoteOperation {
    pub const ALL: [RemoteOperation; 14] = [
        RemoteOperation::GetConversations,
        RemoteOperation::GetInsights,
        RemoteOperation::GetProjectAnalyses,
        RemoteOperation::GetConversationStats,
        RemoteOperation::CreateConversation,
        RemoteOperation::GetMessages,
        RemoteOperation::RateMessage,
        RemoteOperation::DismissInsight,
        RemoteOperation::ImplementInsight,
        RemoteOperation::ArchiveConversation,
        RemoteOperation::TogglePinConversation,
        RemoteOperation::DeleteConversation,
        RemoteOperation::SaveBookmark,
        RemoteOperation::SaveReminder,
    ];
}

#[derive(Debug, Default)]
struct RemoteState {
    conversations: Vec<Conversation>,
    insights: Vec<Insight>,
    analyses: Vec<ProjectAnalysis>,
    stats: ConversationStats,
    messages: HashMap<ConversationId, Vec<Message>>,
    ratings: HashMap<MessageId, Rating>,
    implemented: Vec<(InsightId, String)>,
    created: Vec<ConversationPayload>,
    bookmarks: Vec<Bookmark>,
    reminders: Vec<Reminder>,
    failing: HashSet<RemoteOperation>,
    next_id: u64,
}

#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    state: RwLock<RemoteState>,
    calls: AtomicUsize,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conversations(mut self, conversations: Vec<Conversation>) -> Self {
        self.state.get_mut().conversations = conversations;
        self
    }

    pub fn with_insights(mut self, insights: Vec<Insight>) -> Self {
        self.state.get_mut().insights = insights;
        self
    }

    pub fn with_project_analyses(mut self, analyses: Vec<ProjectAnalysis>) -> Self {
        self.state.get_mut().analyses = analyses;
        self
    }

    pub fn with_stats(mut self, stats: ConversationStats) -> Self {
        self.state.get_mut().stats = stats;
        self
    }

    pub fn with_messages(mut self, conversation_id: ConversationId, messages: Vec<Message>) -> Self {
        self.state.get_mut().messages.insert(conversation_id, messages);
        self
    }

    /// Makes `operation` fail until [`InMemoryRemoteStore::recover`] is called.
    pub async fn fail(&self, operation: RemoteOperation) {
        self.state.write().await.failing.insert(operation);
    }

    pub async fn fail_all(&self) {
        self.state.write().await.failing.extend(RemoteOperation::ALL);
    }

    pub async fn recover(&self) {
        self.state.write().await.failing.clear();
    }

    /// Number of operations attempted, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn rating_for(&self, message_id: &MessageId) -> Option<Rating> {
        self.state.read().await.ratings.get(message_id).copied()
    }

    pub async fn rating_count(&self) -> usize {
        self.state.read().await.ratings.len()
    }

    pub async fn insights(&self) -> Vec<Insight> {
        self.state.read().await.insights.clone()
    }

    pub async fn implemented(&self) -> Vec<(InsightId, String)> {
        self.state.read().await.implemented.clone()
    }

    pub async fn created_conversations(&self) -> Vec<ConversationPayload> {
        self.state.read().await.created.clone()
    }

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.read().await.conversations.clone()
    }

    pub async fn bookmarks(&self) -> Vec<Bookmark> {
        self.state.read().await.bookmarks.clone()
    }

    pub async fn reminders(&self) -> Vec<Reminder> {
        self.state.read().await.reminders.clone()
    }

    async fn guard(&self, operation: RemoteOperation) -> Result<(), PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.state.read().await.failing.contains(&operation) {
            return Err(PersistenceError::Remote(format!("{:?} failed", operation)));
        }
        Ok(())
    }
}

fn conversation_mut<'a>(
    conversations: &'a mut [Conversation],
    id: &ConversationId,
) -> Result<&'a mut Conversation, PersistenceError> {
    conversations
        .iter_mut()
        .find(|c| &c.id == id)
        .ok_or_else(|| PersistenceError::NotFound(format!("conversation {}", id)))
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn get_conversations(
        &self,
        _user_id: &UserId,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, PersistenceError> {
        self.guard(RemoteOperation::GetConversations).await?;
        let state = self.state.read().await;
        Ok(state
            .conversations
            .iter()
            .filter(|c| filter.status.admits(c))
            .cloned()
            .collect())
    }

    async fn get_insights(
        &self,
        _user_id: &UserId,
        filter: &InsightFilter,
    ) -> Result<Vec<Insight>, PersistenceError> {
        self.guard(RemoteOperation::GetInsights).await?;
        let state = self.state.read().await;
        Ok(state
            .insights
            .iter()
            .filter(|i| i.state == filter.status)
            .cloned()
            .collect())
    }

    async fn get_project_analyses(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<ProjectAnalysis>, PersistenceError> {
        self.guard(RemoteOperation::GetProjectAnalyses).await?;
        Ok(self.state.read().await.analyses.clone())
    }

    async fn get_conversation_stats(
        &self,
        _user_id: &UserId,
    ) -> Result<ConversationStats, PersistenceError> {
        self.guard(RemoteOperation::GetConversationStats).await?;
        Ok(self.state.read().await.stats.clone())
    }

    async fn create_conversation(
        &self,
        _user_id: &UserId,
        payload: &ConversationPayload,
    ) -> Result<ConversationSummary, PersistenceError> {
        self.guard(RemoteOperation::CreateConversation).await?;
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = ConversationId::new(format!("remote-{}", state.next_id))
            .map_err(|e| PersistenceError::Remote(e.to_string()))?;
        let summary = ConversationSummary {
            id,
            title: payload.title.clone(),
            tags: payload.tags.clone(),
            created_at: Timestamp::now(),
        };
        state.conversations.insert(0, payload.clone().into_conversation(&summary));
        state.created.push(payload.clone());
        Ok(summary)
    }

    async fn get_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, PersistenceError> {
        self.guard(RemoteOperation::GetMessages).await?;
        Ok(self
            .state
            .read()
            .await
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn rate_message(
        &self,
        message_id: &MessageId,
        rating: Rating,
    ) -> Result<(), PersistenceError> {
        self.guard(RemoteOperation::RateMessage).await?;
        self.state.write().await.ratings.insert(*message_id, rating);
        Ok(())
    }

    async fn dismiss_insight(&self, insight_id: &InsightId) -> Result<(), PersistenceError> {
        self.guard(RemoteOperation::DismissInsight).await?;
        let mut state = self.state.write().await;
        if let Some(insight) = state.insights.iter_mut().find(|i| &i.id == insight_id) {
            insight.state = InsightState::Dismissed;
        }
        Ok(())
    }

    async fn implement_insight(
        &self,
        insight_id: &InsightId,
        action: &str,
    ) -> Result<(), PersistenceError> {
        self.guard(RemoteOperation::ImplementInsight).await?;
        let mut state = self.state.write().await;
        if let Some(insight) = state.insights.iter_mut().find(|i| &i.id == insight_id) {
            insight.state = InsightState::Implemented;
        }
        state.implemented.push((insight_id.clone(), action.to_string()));
        Ok(())
    }

    async fn archive_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), PersistenceError> {
        self.guard(RemoteOperation::ArchiveConversation).await?;
        let mut state = self.state.write().await;
        conversation_mut(&mut state.conversations, conversation_id)?.archived = true;
        Ok(())
    }

    async fn toggle_pin_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), PersistenceError> {
        self.guard(RemoteOperation::TogglePinConversation).await?;
        let mut state = self.state.write().await;
        let conversation = conversation_mut(&mut state.conversations, conversation_id)?;
        conversation.pinned = !conversation.pinned;
        Ok(())
    }

    async fn delete_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), PersistenceError> {
        self.guard(RemoteOperation::DeleteConversation).await?;
        let mut state = self.state.write().await;
        state.conversations.retain(|c| &c.id != conversation_id);
        state.messages.remove(conversation_id);
        Ok(())
    }

    async fn save_bookmark(
        &self,
        _user_id: &UserId,
        bookmark: &Bookmark,
    ) -> Result<(), PersistenceError> {
        self.guard(RemoteOperation::SaveBookmark).await?;
        self.state.write().await.bookmarks.push(bookmark.clone());
        Ok(())
    }

    async fn save_reminder(
        &self,
        _user_id: &UserId,
        reminder: &Reminder,
    ) -> Result<(), PersistenceError> {
        self.guard(RemoteOperation::SaveReminder).await?;
        self.state.write().await.reminders.push(reminder.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[tokio::test]
    async fn filters_active_insights() {
        let mut insights = seed::demo_insights();
        insights[1].state = InsightState::Dismissed;
        let store = InMemoryRemoteStore::new().with_insights(insights);
        let active = store.get_insights(&user(), &InsightFilter::active()).await.unwrap();
        assert_eq!(active.len(), 4);
    }

    #[tokio::test]
    async fn injected_failure_is_per_operation() {
        let store = InMemoryRemoteStore::new();
        store.fail(RemoteOperation::RateMessage).await;
        assert!(store.rate_message(&MessageId::new(), Rating::Up).await.is_err());
        assert!(store.dismiss_insight(&InsightId::new("1").unwrap()).await.is_ok());
        store.recover().await;
        assert!(store.rate_message(&MessageId::new(), Rating::Up).await.is_ok());
        assert_eq!(store.call_count(), 3);
    }

    #[tokio::test]
    async fn create_assigns_ids_and_lists_conversation() {
        let store = InMemoryRemoteStore::new();
        let payload = ConversationPayload::snapshot(
            &[Message::user("Plan my week")],
            "anthropic",
            ["planning"],
            "New Conversation",
        );
        let summary = store.create_conversation(&user(), &payload).await.unwrap();
        assert_eq!(summary.id.as_str(), "remote-1");
        let listed = store
            .get_conversations(&user(), &ConversationFilter::active())
            .await
            .unwrap();
        assert_eq!(listed[0].title, "Plan my week");
        assert_eq!(listed[0].message_count, 1);
    }

    #[tokio::test]
    async fn archive_hides_from_active_listing() {
        let store = InMemoryRemoteStore::new().with_conversations(seed::demo_conversations(Timestamp::now()));
        let id = ConversationId::new("2").unwrap();
        store.archive_conversation(&id).await.unwrap();
        let active = store
            .get_conversations(&user(), &ConversationFilter::active())
            .await
            .unwrap();
        assert_eq!(active.len(), 2);
        assert!(store.archive_conversation(&ConversationId::new("99").unwrap()).await.is_err());
    }
}
