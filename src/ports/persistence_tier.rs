//! Persistence Tier Port - one backend in the ordered fallback chain.
//!
//! A durable write or read is described once as a [`DurableWrite`] or
//! [`ReadQuery`] value and handed to each tier in turn. Tiers decide
//! whether they can serve it; the chain decides what happens on failure.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::conversation::{
    Bookmark, Conversation, ConversationFilter, ConversationPayload, ConversationStats,
    ConversationSummary, Message, Rating,
};
use crate::domain::foundation::{ConversationId, Identity, InsightId, MessageId};
use crate::domain::insight::{Insight, InsightFilter, ProjectAnalysis, Reminder};

/// Errors raised by persistence backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// The backend cannot be reached or refuses this caller.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The remote store answered with an error.
    #[error("remote store error: {0}")]
    Remote(String),

    /// The device-local store failed.
    #[error("local store error: {0}")]
    Local(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// This tier does not serve the requested operation.
    #[error("operation not supported by this tier: {0}")]
    Unsupported(String),

    #[error("record not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

/// Which kind of backend a tier is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierKind {
    Remote,
    Local,
    NoOp,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TierKind::Remote => "remote",
            TierKind::Local => "local",
            TierKind::NoOp => "noop",
        })
    }
}

/// Every durable mutation the assistant performs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DurableWrite {
    SaveConversation { payload: ConversationPayload },
    RateMessage { message_id: MessageId, rating: Rating },
    DismissInsight { insight_id: InsightId },
    ImplementInsight { insight_id: InsightId, action: String },
    BookmarkMessage { bookmark: Bookmark },
    ScheduleReminder { reminder: Reminder },
    ArchiveConversation { conversation_id: ConversationId },
    TogglePinConversation { conversation_id: ConversationId },
    DeleteConversation { conversation_id: ConversationId },
}

impl DurableWrite {
    /// Stable name used in logs and as the local-store key suffix.
    pub fn label(&self) -> &'static str {
        match self {
            DurableWrite::SaveConversation { .. } => "saved_conversations",
            DurableWrite::RateMessage { .. } => "message_ratings",
            DurableWrite::DismissInsight { .. } => "dismissed_insights",
            DurableWrite::ImplementInsight { .. } => "implemented_insights",
            DurableWrite::BookmarkMessage { .. } => "bookmarks",
            DurableWrite::ScheduleReminder { .. } => "reminders",
            DurableWrite::ArchiveConversation { .. } => "archived_conversations",
            DurableWrite::TogglePinConversation { .. } => "pinned_conversations",
            DurableWrite::DeleteConversation { .. } => "deleted_conversations",
        }
    }
}

/// What a tier reports after accepting a write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteReceipt {
    Applied,
    /// A conversation was created and assigned a durable id.
    ConversationCreated(ConversationSummary),
    /// Nothing was stored.
    Discarded,
}

impl WriteReceipt {
    pub fn conversation(&self) -> Option<&ConversationSummary> {
        match self {
            WriteReceipt::ConversationCreated(summary) => Some(summary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadQuery {
    Conversations(ConversationFilter),
    Insights(InsightFilter),
    ProjectAnalyses,
    ConversationStats,
    Messages(ConversationId),
}

impl ReadQuery {
    pub fn label(&self) -> &'static str {
        match self {
            ReadQuery::Conversations(_) => "conversations",
            ReadQuery::Insights(_) => "insights",
            ReadQuery::ProjectAnalyses => "project_analyses",
            ReadQuery::ConversationStats => "conversation_stats",
            ReadQuery::Messages(_) => "messages",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadResult {
    Conversations(Vec<Conversation>),
    Insights(Vec<Insight>),
    ProjectAnalyses(Vec<ProjectAnalysis>),
    ConversationStats(ConversationStats),
    Messages(Vec<Message>),
    /// The tier had nothing to offer.
    Nothing,
}

impl ReadResult {
    pub fn into_conversations(self) -> Option<Vec<Conversation>> {
        match self {
            ReadResult::Conversations(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_insights(self) -> Option<Vec<Insight>> {
        match self {
            ReadResult::Insights(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_project_analyses(self) -> Option<Vec<ProjectAnalysis>> {
        match self {
            ReadResult::ProjectAnalyses(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_conversation_stats(self) -> Option<ConversationStats> {
        match self {
            ReadResult::ConversationStats(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_messages(self) -> Option<Vec<Message>> {
        match self {
            ReadResult::Messages(v) => Some(v),
            _ => None,
        }
    }
}

/// One backend in the persistence chain.
#[async_trait]
pub trait PersistenceTier: Send + Sync {
    fn kind(&self) -> TierKind;

    /// Whether this tier can serve `identity` at all. Unavailable tiers are
    /// skipped without counting as a failure.
    fn is_available(&self, identity: &Identity) -> bool;

    async fn write(
        &self,
        identity: &Identity,
        write: &DurableWrite,
    ) -> Result<WriteReceipt, PersistenceError>;

    /// Answer a read. Tiers return [`PersistenceError::Unsupported`] for
    /// queries they do not serve.
    async fn read(&self, identity: &Identity, query: &ReadQuery)
        -> Result<ReadResult, PersistenceError>;
}
