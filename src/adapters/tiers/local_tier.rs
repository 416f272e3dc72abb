//! Local tier - device-local fallback behind the remote store.
//!
//! Every write kind owns one list key (`{prefix}.{label}`). A mutation loads
//! the whole list, appends one record and saves the whole list back. Saved
//! conversations are stored as full `Conversation` records so the tier can
//! answer conversation reads; everything else is an audit record carrying
//! the write itself plus `recorded_at`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::conversation::{Conversation, ConversationFilter, ConversationSummary};
use crate::domain::foundation::{ConversationId, Identity, Timestamp};
use crate::ports::{
    DurableWrite, LocalStore, PersistenceError, PersistenceTier, ReadQuery, ReadResult, TierKind,
    WriteReceipt,
};

const SAVED_CONVERSATIONS: &str = "saved_conversations";

pub struct LocalTier {
    store: Arc<dyn LocalStore>,
    key_prefix: String,
}

impl LocalTier {
    pub fn new(store: Arc<dyn LocalStore>, key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
        }
    }

    /// The list key used for `label`.
    pub fn key(&self, label: &str) -> String {
        format!("{}.{}", self.key_prefix, label)
    }

    async fn append(&self, key: &str, record: Value) -> Result<(), PersistenceError> {
        let mut items = self.store.load_list(key).await?;
        items.push(record);
        self.store.save_list(key, &items).await
    }

    async fn saved_conversations(&self) -> Result<Vec<Conversation>, PersistenceError> {
        let items = self.store.load_list(&self.key(SAVED_CONVERSATIONS)).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Conversation>(item) {
                Ok(conversation) => Some(conversation),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed saved conversation");
                    None
                }
            })
            .collect())
    }

    async fn save_conversation(
        &self,
        write: &DurableWrite,
    ) -> Result<WriteReceipt, PersistenceError> {
        let DurableWrite::SaveConversation { payload } = write else {
            return Err(PersistenceError::Unsupported(write.label().to_string()));
        };
        let summary = ConversationSummary {
            id: ConversationId::local(),
            title: payload.title.clone(),
            tags: payload.tags.clone(),
            created_at: Timestamp::now(),
        };
        let conversation = payload.clone().into_conversation(&summary);
        self.append(&self.key(SAVED_CONVERSATIONS), serde_json::to_value(&conversation)?)
            .await?;
        Ok(WriteReceipt::ConversationCreated(summary))
    }

    /// Applies an archive, pin or delete to a conversation saved on this
    /// device. Conversations held only remotely are left alone.
    async fn update_saved(&self, write: &DurableWrite) -> Result<(), PersistenceError> {
        let id = match write {
            DurableWrite::ArchiveConversation { conversation_id }
            | DurableWrite::TogglePinConversation { conversation_id }
            | DurableWrite::DeleteConversation { conversation_id } => conversation_id,
            _ => return Ok(()),
        };

        let mut saved = self.saved_conversations().await?;
        let Some(index) = saved.iter().position(|c| &c.id == id) else {
            return Ok(());
        };
        match write {
            DurableWrite::ArchiveConversation { .. } => saved[index].archived = true,
            DurableWrite::TogglePinConversation { .. } => {
                saved[index].pinned = !saved[index].pinned
            }
            _ => {
                saved.remove(index);
            }
        }

        let items = saved
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.store
            .save_list(&self.key(SAVED_CONVERSATIONS), &items)
            .await
    }
}

fn audit_record(write: &DurableWrite) -> Result<Value, PersistenceError> {
    let mut record = json!({ "recorded_at": Timestamp::now() });
    if let (Value::Object(target), Value::Object(fields)) =
        (&mut record, serde_json::to_value(write)?)
    {
        target.extend(fields);
    }
    Ok(record)
}

#[async_trait]
impl PersistenceTier for LocalTier {
    fn kind(&self) -> TierKind {
        TierKind::Local
    }

    fn is_available(&self, _identity: &Identity) -> bool {
        true
    }

    async fn write(
        &self,
        _identity: &Identity,
        write: &DurableWrite,
    ) -> Result<WriteReceipt, PersistenceError> {
        if matches!(write, DurableWrite::SaveConversation { .. }) {
            return self.save_conversation(write).await;
        }
        self.append(&self.key(write.label()), audit_record(write)?)
            .await?;
        self.update_saved(write).await?;
        Ok(WriteReceipt::Applied)
    }

    async fn read(
        &self,
        _identity: &Identity,
        query: &ReadQuery,
    ) -> Result<ReadResult, PersistenceError> {
        match query {
            ReadQuery::Conversations(ConversationFilter { status }) => {
                let saved = self.saved_conversations().await?;
                Ok(ReadResult::Conversations(
                    saved.into_iter().filter(|c| status.admits(c)).collect(),
                ))
            }
            other => Err(PersistenceError::Unsupported(other.label().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::InMemoryLocalStore;
    use crate::domain::conversation::{ConversationPayload, ConversationStatus, Message};
    use crate::domain::foundation::InsightId;

    fn tier() -> (Arc<InMemoryLocalStore>, LocalTier) {
        let store = Arc::new(InMemoryLocalStore::new());
        (store.clone(), LocalTier::new(store, "assistant"))
    }

    fn payload(text: &str) -> ConversationPayload {
        ConversationPayload::snapshot(
            &[Message::assistant("hi"), Message::user(text)],
            "anthropic",
            ["work"],
            "New Conversation",
        )
    }

    #[tokio::test]
    async fn dismiss_appends_one_record_per_call() {
        let (store, tier) = tier();
        let write = DurableWrite::DismissInsight {
            insight_id: InsightId::new("3").unwrap(),
        };

        tier.write(&Identity::Anonymous, &write).await.unwrap();
        tier.write(&Identity::Anonymous, &write).await.unwrap();

        let list = store.list("assistant.dismissed_insights").await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["kind"], "dismiss_insight");
        assert_eq!(list[0]["insight_id"], "3");
        assert!(list[0]["recorded_at"].is_string());
    }

    #[tokio::test]
    async fn saved_conversation_gets_local_id_and_is_readable() {
        let (_, tier) = tier();
        let receipt = tier
            .write(
                &Identity::Anonymous,
                &DurableWrite::SaveConversation {
                    payload: payload("Plan the launch"),
                },
            )
            .await
            .unwrap();
        let summary = receipt.conversation().unwrap().clone();
        assert!(summary.id.is_local());

        let listed = tier
            .read(
                &Identity::Anonymous,
                &ReadQuery::Conversations(ConversationFilter::active()),
            )
            .await
            .unwrap()
            .into_conversations()
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, summary.id);
        assert_eq!(listed[0].message_count, 2);
    }

    #[tokio::test]
    async fn archive_updates_saved_conversation() {
        let (_, tier) = tier();
        let receipt = tier
            .write(
                &Identity::Anonymous,
                &DurableWrite::SaveConversation {
                    payload: payload("Quarterly review"),
                },
            )
            .await
            .unwrap();
        let id = receipt.conversation().unwrap().id.clone();

        tier.write(
            &Identity::Anonymous,
            &DurableWrite::ArchiveConversation {
                conversation_id: id,
            },
        )
        .await
        .unwrap();

        let active = tier
            .read(
                &Identity::Anonymous,
                &ReadQuery::Conversations(ConversationFilter::active()),
            )
            .await
            .unwrap()
            .into_conversations()
            .unwrap();
        assert!(active.is_empty());

        let archived = tier
            .read(
                &Identity::Anonymous,
                &ReadQuery::Conversations(ConversationFilter {
                    status: ConversationStatus::Archived,
                }),
            )
            .await
            .unwrap()
            .into_conversations()
            .unwrap();
        assert_eq!(archived.len(), 1);
    }

    #[tokio::test]
    async fn other_reads_are_unsupported() {
        let (_, tier) = tier();
        let result = tier.read(&Identity::Anonymous, &ReadQuery::ProjectAnalyses).await;
        assert!(matches!(result, Err(PersistenceError::Unsupported(_))));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_error() {
        let (store, tier) = tier();
        store.set_failing(true);
        let result = tier
            .write(
                &Identity::Anonymous,
                &DurableWrite::DismissInsight {
                    insight_id: InsightId::new("1").unwrap(),
                },
            )
            .await;
        assert!(matches!(result, Err(PersistenceError::Local(_))));
    }
}
