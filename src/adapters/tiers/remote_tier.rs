//! Remote tier - the source of truth for signed-in users.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{Identity, UserId};
use crate::ports::{
    DurableWrite, PersistenceError, PersistenceTier, ReadQuery, ReadResult, RemoteStore,
    TierKind, WriteReceipt,
};

pub struct RemoteTier {
    store: Arc<dyn RemoteStore>,
}

impl RemoteTier {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }
}

fn require_user(identity: &Identity) -> Result<&UserId, PersistenceError> {
    identity
        .user_id()
        .ok_or_else(|| PersistenceError::Unavailable("no signed-in user".to_string()))
}

#[async_trait]
impl PersistenceTier for RemoteTier {
    fn kind(&self) -> TierKind {
        TierKind::Remote
    }

    fn is_available(&self, identity: &Identity) -> bool {
        identity.is_known()
    }

    async fn write(
        &self,
        identity: &Identity,
        write: &DurableWrite,
    ) -> Result<WriteReceipt, PersistenceError> {
        let user_id = require_user(identity)?;
        match write {
            DurableWrite::SaveConversation { payload } => {
                let summary = self.store.create_conversation(user_id, payload).await?;
                return Ok(WriteReceipt::ConversationCreated(summary));
            }
            DurableWrite::RateMessage { message_id, rating } => {
                self.store.rate_message(message_id, *rating).await?
            }
            DurableWrite::DismissInsight { insight_id } => {
                self.store.dismiss_insight(insight_id).await?
            }
            DurableWrite::ImplementInsight { insight_id, action } => {
                self.store.implement_insight(insight_id, action).await?
            }
            DurableWrite::BookmarkMessage { bookmark } => {
                self.store.save_bookmark(user_id, bookmark).await?
            }
            DurableWrite::ScheduleReminder { reminder } => {
                self.store.save_reminder(user_id, reminder).await?
            }
            DurableWrite::ArchiveConversation { conversation_id } => {
                self.store.archive_conversation(conversation_id).await?
            }
            DurableWrite::TogglePinConversation { conversation_id } => {
                self.store.toggle_pin_conversation(conversation_id).await?
            }
            DurableWrite::DeleteConversation { conversation_id } => {
                self.store.delete_conversation(conversation_id).await?
            }
        }
        Ok(WriteReceipt::Applied)
    }

    async fn read(
        &self,
        identity: &Identity,
        query: &ReadQuery,
    ) -> Result<ReadResult, PersistenceError> {
        let user_id = require_user(identity)?;
        Ok(match query {
            ReadQuery::Conversations(filter) => {
                ReadResult::Conversations(self.store.get_conversations(user_id, filter).await?)
            }
            ReadQuery::Insights(filter) => {
                ReadResult::Insights(self.store.get_insights(user_id, filter).await?)
            }
            ReadQuery::ProjectAnalyses => {
                ReadResult::ProjectAnalyses(self.store.get_project_analyses(user_id).await?)
            }
            ReadQuery::ConversationStats => {
                ReadResult::ConversationStats(self.store.get_conversation_stats(user_id).await?)
            }
            ReadQuery::Messages(conversation_id) => {
                ReadResult::Messages(self.store.get_messages(conversation_id).await?)
            }
        })
    }
}
