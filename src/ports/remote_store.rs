//! Remote Store Port - the source of truth for signed-in users.

use async_trait::async_trait;

use super::persistence_tier::PersistenceError;
use crate::domain::conversation::{
    Bookmark, Conversation, ConversationFilter, ConversationPayload, ConversationStats,
    ConversationSummary, Message, Rating,
};
use crate::domain::foundation::{ConversationId, InsightId, MessageId, UserId};
use crate::domain::insight::{Insight, InsightFilter, ProjectAnalysis, Reminder};

/// Port for the remote assistant data store.
///
/// Reads are scoped to a user; mutations of existing records are addressed by
/// record id alone.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get_conversations(
        &self,
        user_id: &UserId,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, PersistenceError>;

    async fn get_insights(
        &self,
        user_id: &UserId,
        filter: &InsightFilter,
    ) -> Result<Vec<Insight>, PersistenceError>;

    async fn get_project_analyses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProjectAnalysis>, PersistenceError>;

    async fn get_conversation_stats(
        &self,
        user_id: &UserId,
    ) -> Result<ConversationStats, PersistenceError>;

    /// Create a conversation and return its assigned id.
    async fn create_conversation(
        &self,
        user_id: &UserId,
        payload: &ConversationPayload,
    ) -> Result<ConversationSummary, PersistenceError>;

    async fn get_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, PersistenceError>;

    async fn rate_message(
        &self,
        message_id: &MessageId,
        rating: Rating,
    ) -> Result<(), PersistenceError>;

    async fn dismiss_insight(&self, insight_id: &InsightId) -> Result<(), PersistenceError>;

    async fn implement_insight(
        &self,
        insight_id: &InsightId,
        action: &str,
    ) -> Result<(), PersistenceError>;

    async fn archive_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), PersistenceError>;

    async fn toggle_pin_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), PersistenceError>;

    async fn delete_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), PersistenceError>;

    async fn save_bookmark(
        &self,
        user_id: &UserId,
        bookmark: &Bookmark,
    ) -> Result<(), PersistenceError>;

    async fn save_reminder(
        &self,
        user_id: &UserId,
        reminder: &Reminder,
    ) -> Result<(), PersistenceError>;
}
