//! Where session reads come from.
//!
//! Signed-in users read through the tier chain. Anonymous sessions run on
//! the demo data, plus whatever conversations were saved on this device.

use crate::domain::conversation::{Conversation, ConversationFilter, ConversationStats, Message};
use crate::domain::foundation::{ConversationId, Identity, Timestamp, UserId};
use crate::domain::insight::{Insight, InsightFilter, ProjectAnalysis};
use crate::domain::seed;
use crate::ports::{PersistenceError, ReadQuery, ReadResult};

use super::chain::TierChain;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Authenticated(UserId),
    Anonymous,
}

impl DataSource {
    pub fn for_identity(identity: &Identity) -> Self {
        match identity.user_id() {
            Some(user_id) => DataSource::Authenticated(user_id.clone()),
            None => DataSource::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, DataSource::Authenticated(_))
    }

    fn identity(&self) -> Identity {
        match self {
            DataSource::Authenticated(user_id) => Identity::known(user_id.clone()),
            DataSource::Anonymous => Identity::Anonymous,
        }
    }

    async fn read<T>(
        &self,
        chain: &TierChain,
        query: ReadQuery,
        extract: fn(ReadResult) -> Option<T>,
    ) -> Result<Option<T>, PersistenceError> {
        let result = chain.read(&self.identity(), &query).await.into_result()?;
        Ok(result.and_then(extract))
    }

    pub async fn conversations(
        &self,
        chain: &TierChain,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, PersistenceError> {
        let stored = self
            .read(
                chain,
                ReadQuery::Conversations(filter.clone()),
                ReadResult::into_conversations,
            )
            .await?
            .unwrap_or_default();

        match self {
            DataSource::Authenticated(_) => Ok(stored),
            DataSource::Anonymous => {
                let demo = seed::demo_conversations(Timestamp::now())
                    .into_iter()
                    .filter(|c| filter.status.admits(c));
                Ok(stored.into_iter().chain(demo).collect())
            }
        }
    }

    pub async fn insights(
        &self,
        chain: &TierChain,
        filter: &InsightFilter,
    ) -> Result<Vec<Insight>, PersistenceError> {
        match self {
            DataSource::Authenticated(_) => Ok(self
                .read(chain, ReadQuery::Insights(filter.clone()), ReadResult::into_insights)
                .await?
                .unwrap_or_default()),
            DataSource::Anonymous => Ok(seed::demo_insights()
                .into_iter()
                .filter(|i| i.state == filter.status)
                .collect()),
        }
    }

    pub async fn project_analyses(
        &self,
        chain: &TierChain,
    ) -> Result<Vec<ProjectAnalysis>, PersistenceError> {
        match self {
            DataSource::Authenticated(_) => Ok(self
                .read(chain, ReadQuery::ProjectAnalyses, ReadResult::into_project_analyses)
                .await?
                .unwrap_or_default()),
            DataSource::Anonymous => Ok(seed::demo_project_analyses()),
        }
    }

    /// Aggregate stats; anonymous sessions have none.
    pub async fn conversation_stats(
        &self,
        chain: &TierChain,
    ) -> Result<Option<ConversationStats>, PersistenceError> {
        match self {
            DataSource::Authenticated(_) => {
                self.read(
                    chain,
                    ReadQuery::ConversationStats,
                    ReadResult::into_conversation_stats,
                )
                .await
            }
            DataSource::Anonymous => Ok(None),
        }
    }

    pub async fn messages(
        &self,
        chain: &TierChain,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, PersistenceError> {
        match self {
            DataSource::Authenticated(_) => Ok(self
                .read(
                    chain,
                    ReadQuery::Messages(conversation_id.clone()),
                    ReadResult::into_messages,
                )
                .await?
                .unwrap_or_default()),
            DataSource::Anonymous => Ok(Vec::new()),
        }
    }
}
