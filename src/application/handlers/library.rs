//! Conversation library flows: save, new, load, delete, archive, pin,
//! export and share.

use std::sync::Arc;

use crate::application::persistence::{ChainOutcome, DataSource, TierChain};
use crate::application::AssistantError;
use crate::domain::conversation::{
    Conversation, ConversationLibrary, ConversationPayload, ConversationStore, LibraryStats,
};
use crate::domain::export::{share_link, ConversationExport};
use crate::domain::foundation::{ConversationId, Identity, Timestamp, ValidationError};
use crate::domain::notification::Notification;
use crate::domain::seed;
use crate::ports::{DurableWrite, Notifier, PersistenceError, WriteReceipt};

/// Title used when a manual save has no user message to derive one from.
pub const DEFAULT_TITLE: &str = "New Conversation";
/// Tag attached to conversations saved by the new-conversation flow.
pub const AUTO_SAVED_TAG: &str = "auto-saved";

#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// The library entry, when a tier assigned the conversation an id.
    pub conversation: Option<Conversation>,
    pub persistence: ChainOutcome<WriteReceipt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewConversationOutcome {
    /// Present when the previous conversation was auto-saved.
    pub auto_saved: Option<SaveOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadConversationOutcome {
    Loaded { message_count: usize },
    /// The source had no messages; the store is unchanged.
    Empty,
    /// The fetch failed; the store is unchanged.
    Failed(PersistenceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

pub struct ConversationManager {
    chain: TierChain,
    notifier: Arc<dyn Notifier>,
    library: ConversationLibrary,
}

impl ConversationManager {
    pub fn new(chain: TierChain, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            chain,
            notifier,
            library: ConversationLibrary::default(),
        }
    }

    pub fn replace_all(&mut self, conversations: Vec<Conversation>) {
        self.library.replace_all(conversations);
    }

    /// Re-reads the library from `source`.
    pub async fn load_library(&mut self, source: &DataSource) -> Result<usize, PersistenceError> {
        let conversations = source
            .conversations(&self.chain, &Default::default())
            .await?;
        self.library.replace_all(conversations);
        Ok(self.library.len())
    }

    async fn persist_snapshot(
        &mut self,
        identity: &Identity,
        payload: ConversationPayload,
    ) -> SaveOutcome {
        let persistence = self
            .chain
            .write(
                identity,
                &DurableWrite::SaveConversation {
                    payload: payload.clone(),
                },
            )
            .await;

        let conversation = persistence
            .value
            .as_ref()
            .and_then(WriteReceipt::conversation)
            .map(|summary| payload.into_conversation(summary));
        if let Some(conversation) = &conversation {
            tracing::info!(
                conversation_id = %conversation.id,
                messages = conversation.message_count,
                tier = %persistence.tier,
                "conversation saved"
            );
            self.library.prepend(conversation.clone());
        }

        SaveOutcome {
            conversation,
            persistence,
        }
    }

    /// Saves the store as a new conversation.
    pub async fn save_chat(
        &mut self,
        store: &ConversationStore,
        identity: &Identity,
        model: &str,
        tags: &[String],
    ) -> Result<SaveOutcome, ValidationError> {
        if store.is_empty() {
            return Err(ValidationError::NothingToSave);
        }
        let payload = ConversationPayload::snapshot(store.messages(), model, tags, DEFAULT_TITLE);
        let title = payload.title.clone();

        let outcome = self.persist_snapshot(identity, payload).await;
        self.notifier.notify(outcome.persistence.notification_or(
            Notification::success("Conversation saved").with_description(title),
            "Failed to save conversation",
        ));
        Ok(outcome)
    }

    /// Starts over with the new-conversation greeting.
    ///
    /// A signed-in user's previous conversation is auto-saved first when it
    /// holds more than the greeting.
    pub async fn new_conversation(
        &mut self,
        store: &mut ConversationStore,
        identity: &Identity,
        model: &str,
    ) -> Result<NewConversationOutcome, AssistantError> {
        if store.has_pending() {
            return Err(ValidationError::RequestInFlight.into());
        }

        let auto_saved = if identity.is_known() && store.len() > 1 {
            let fallback = format!("Conversation {}", Timestamp::now().date_string());
            let payload =
                ConversationPayload::snapshot(store.messages(), model, [AUTO_SAVED_TAG], &fallback);
            let outcome = self.persist_snapshot(identity, payload).await;
            if let Some(note) = outcome
                .persistence
                .failure_notification("Failed to auto-save conversation")
            {
                self.notifier.notify(note);
            }
            Some(outcome)
        } else {
            None
        };

        store.reset_to(vec![seed::new_conversation_greeting()]);
        self.notifier.notify(Notification::success("New conversation started"));
        Ok(NewConversationOutcome { auto_saved })
    }

    /// Replaces the store with a saved conversation's messages.
    pub async fn load_conversation(
        &self,
        store: &mut ConversationStore,
        source: &DataSource,
        id: &ConversationId,
    ) -> Result<LoadConversationOutcome, AssistantError> {
        if store.has_pending() {
            return Err(ValidationError::RequestInFlight.into());
        }

        match source.messages(&self.chain, id).await {
            Ok(messages) if messages.is_empty() => {
                self.notifier.notify(
                    Notification::info("No messages found")
                        .with_description("This conversation has no saved messages"),
                );
                Ok(LoadConversationOutcome::Empty)
            }
            Ok(messages) => {
                let message_count = messages.len();
                store.reset_to(messages);
                let title = self
                    .library
                    .get(id)
                    .map(|c| c.title.clone())
                    .unwrap_or_else(|| id.to_string());
                self.notifier.notify(
                    Notification::success("Conversation loaded").with_description(title),
                );
                Ok(LoadConversationOutcome::Loaded { message_count })
            }
            Err(error) => {
                tracing::warn!(conversation_id = %id, error = %error, "failed to load conversation");
                self.notifier.notify(
                    Notification::error("Failed to load conversation")
                        .with_description(error.to_string()),
                );
                Ok(LoadConversationOutcome::Failed(error))
            }
        }
    }

    pub async fn delete(
        &mut self,
        identity: &Identity,
        id: &ConversationId,
    ) -> Result<ChainOutcome<WriteReceipt>, ValidationError> {
        self.library
            .remove(id)
            .ok_or_else(|| ValidationError::ConversationNotFound(id.clone()))?;
        let outcome = self
            .chain
            .write(
                identity,
                &DurableWrite::DeleteConversation {
                    conversation_id: id.clone(),
                },
            )
            .await;
        self.notifier.notify(outcome.notification_or(
            Notification::success("Conversation deleted"),
            "Failed to delete conversation",
        ));
        Ok(outcome)
    }

    /// Archiving hides the conversation from the active library.
    pub async fn archive(
        &mut self,
        identity: &Identity,
        id: &ConversationId,
    ) -> Result<ChainOutcome<WriteReceipt>, ValidationError> {
        self.library
            .remove(id)
            .ok_or_else(|| ValidationError::ConversationNotFound(id.clone()))?;
        let outcome = self
            .chain
            .write(
                identity,
                &DurableWrite::ArchiveConversation {
                    conversation_id: id.clone(),
                },
            )
            .await;
        self.notifier.notify(outcome.notification_or(
            Notification::success("Conversation archived"),
            "Failed to archive conversation",
        ));
        Ok(outcome)
    }

    pub async fn toggle_pin(
        &mut self,
        identity: &Identity,
        id: &ConversationId,
    ) -> Result<ChainOutcome<WriteReceipt>, ValidationError> {
        let pinned = self
            .library
            .toggle_pin(id)
            .ok_or_else(|| ValidationError::ConversationNotFound(id.clone()))?;
        let outcome = self
            .chain
            .write(
                identity,
                &DurableWrite::TogglePinConversation {
                    conversation_id: id.clone(),
                },
            )
            .await;
        let title = if pinned {
            "Conversation pinned"
        } else {
            "Conversation unpinned"
        };
        self.notifier.notify(
            outcome.notification_or(Notification::success(title), "Failed to update pin"),
        );
        Ok(outcome)
    }

    pub fn export(&self, id: &ConversationId) -> Result<ExportFile, ValidationError> {
        let conversation = self
            .library
            .get(id)
            .ok_or_else(|| ValidationError::ConversationNotFound(id.clone()))?;
        let export = ConversationExport::of(conversation, Timestamp::now());
        let file = ExportFile {
            file_name: export.file_name(),
            contents: export.render(),
        };
        self.notifier.notify(
            Notification::success("Conversation exported").with_description(file.file_name.clone()),
        );
        Ok(file)
    }

    pub fn share(&self, base_url: &str, id: &ConversationId) -> Result<String, ValidationError> {
        if self.library.get(id).is_none() {
            return Err(ValidationError::ConversationNotFound(id.clone()));
        }
        let link = share_link(base_url, id);
        self.notifier
            .notify(Notification::success("Share link created").with_description(link.clone()));
        Ok(link)
    }

    pub fn conversations(&self) -> &[Conversation] {
        self.library.all()
    }

    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.library.get(id)
    }

    pub fn filter_by_tag(&self, tag: &str) -> Vec<&Conversation> {
        self.library.filter_by_tag(tag)
    }

    pub fn search(&self, query: &str) -> Vec<&Conversation> {
        self.library.search(query)
    }

    pub fn stats(&self) -> LibraryStats {
        self.library.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::InMemoryLocalStore;
    use crate::adapters::notify::RecordingNotifier;
    use crate::adapters::remote::{InMemoryRemoteStore, RemoteOperation};
    use crate::domain::conversation::Message;
    use crate::domain::foundation::UserId;
    use crate::domain::notification::NotificationLevel;
    use crate::ports::TierKind;

    fn known() -> Identity {
        Identity::known(UserId::new("user-1").unwrap())
    }

    fn conversation_id(value: &str) -> ConversationId {
        ConversationId::new(value).unwrap()
    }

    struct Fixture {
        remote: Arc<InMemoryRemoteStore>,
        local: Arc<InMemoryLocalStore>,
        notifier: Arc<RecordingNotifier>,
        manager: ConversationManager,
    }

    fn fixture() -> Fixture {
        let remote = Arc::new(
            InMemoryRemoteStore::new().with_conversations(seed::demo_conversations(Timestamp::now())),
        );
        let local = Arc::new(InMemoryLocalStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let chain = TierChain::builder()
            .remote(remote.clone())
            .local(local.clone(), "assistant")
            .build();
        let mut manager = ConversationManager::new(chain, notifier.clone());
        manager.replace_all(seed::demo_conversations(Timestamp::now()));
        Fixture {
            remote,
            local,
            notifier,
            manager,
        }
    }

    fn chat() -> ConversationStore {
        ConversationStore::with_messages(vec![
            seed::greeting(),
            Message::user("Help me plan a product launch for next month"),
            Message::assistant("Start with the audience."),
        ])
    }

    mod save {
        use super::*;

        #[tokio::test]
        async fn remote_save_prepends_library_entry() {
            let mut f = fixture();
            let outcome = f
                .manager
                .save_chat(&chat(), &known(), "anthropic", &["launch".to_string()])
                .await
                .unwrap();

            let saved = outcome.conversation.unwrap();
            assert_eq!(saved.id.as_str(), "remote-1");
            assert_eq!(saved.title, "Help me plan a product launch for next month");
            assert_eq!(saved.message_count, 3);
            assert_eq!(f.manager.conversations()[0].id, saved.id);
            assert_eq!(f.manager.conversations().len(), 4);
        }

        #[tokio::test]
        async fn remote_failure_saves_locally() {
            let mut f = fixture();
            f.remote.fail(RemoteOperation::CreateConversation).await;

            let outcome = f
                .manager
                .save_chat(&chat(), &known(), "anthropic", &[])
                .await
                .unwrap();

            assert_eq!(outcome.persistence.tier, TierKind::Local);
            assert!(outcome.conversation.unwrap().id.is_local());
            assert_eq!(f.local.list("assistant.saved_conversations").await.len(), 1);
            assert_eq!(f.notifier.last().unwrap().level, NotificationLevel::Warning);
        }

        #[tokio::test]
        async fn empty_store_is_rejected() {
            let mut f = fixture();
            let err = f
                .manager
                .save_chat(&ConversationStore::new(), &known(), "anthropic", &[])
                .await
                .unwrap_err();
            assert_eq!(err, ValidationError::NothingToSave);
            assert_eq!(f.remote.call_count(), 0);
        }
    }

    mod new_conversation {
        use super::*;

        #[tokio::test]
        async fn auto_saves_for_known_user() {
            let mut f = fixture();
            let mut store = chat();

            let outcome = f
                .manager
                .new_conversation(&mut store, &known(), "anthropic")
                .await
                .unwrap();

            let saved = outcome.auto_saved.unwrap().conversation.unwrap();
            assert!(saved.has_tag(AUTO_SAVED_TAG));
            assert_eq!(store.len(), 1);
            assert_eq!(store.messages()[0].content, seed::NEW_CONVERSATION_GREETING);
        }

        #[tokio::test]
        async fn anonymous_user_is_not_auto_saved() {
            let mut f = fixture();
            let mut store = chat();

            let outcome = f
                .manager
                .new_conversation(&mut store, &Identity::Anonymous, "anthropic")
                .await
                .unwrap();

            assert!(outcome.auto_saved.is_none());
            assert!(f.local.keys().await.is_empty());
            assert_eq!(store.len(), 1);
        }
    }

    mod load {
        use super::*;

        #[tokio::test]
        async fn replaces_store_with_saved_messages() {
            let remote = InMemoryRemoteStore::new().with_messages(
                conversation_id("1"),
                vec![Message::user("old question"), Message::assistant("old answer")],
            );
            let notifier = Arc::new(RecordingNotifier::new());
            let manager = ConversationManager::new(
                TierChain::builder().remote(Arc::new(remote)).build(),
                notifier,
            );
            let mut store = chat();

            let outcome = manager
                .load_conversation(
                    &mut store,
                    &DataSource::Authenticated(UserId::new("user-1").unwrap()),
                    &conversation_id("1"),
                )
                .await
                .unwrap();

            assert_eq!(outcome, LoadConversationOutcome::Loaded { message_count: 2 });
            assert_eq!(store.messages()[0].content, "old question");
        }

        #[tokio::test]
        async fn empty_result_keeps_store() {
            let f = fixture();
            let mut store = chat();

            let outcome = f
                .manager
                .load_conversation(
                    &mut store,
                    &DataSource::Authenticated(UserId::new("user-1").unwrap()),
                    &conversation_id("1"),
                )
                .await
                .unwrap();

            assert_eq!(outcome, LoadConversationOutcome::Empty);
            assert_eq!(store.len(), 3);
        }
    }

    mod library_actions {
        use super::*;

        #[tokio::test]
        async fn delete_removes_and_persists() {
            let mut f = fixture();
            f.manager.delete(&known(), &conversation_id("2")).await.unwrap();
            assert!(f.manager.get(&conversation_id("2")).is_none());
            assert_eq!(f.manager.conversations().len(), 2);
        }

        #[tokio::test]
        async fn unknown_conversation_is_rejected() {
            let mut f = fixture();
            let err = f
                .manager
                .archive(&known(), &conversation_id("99"))
                .await
                .unwrap_err();
            assert_eq!(err, ValidationError::ConversationNotFound(conversation_id("99")));
            assert_eq!(f.remote.call_count(), 0);
        }

        #[tokio::test]
        async fn toggle_pin_flips_flag() {
            let mut f = fixture();
            f.manager.toggle_pin(&known(), &conversation_id("1")).await.unwrap();
            assert!(f.manager.get(&conversation_id("1")).unwrap().pinned);
            assert_eq!(f.notifier.last().unwrap().title, "Conversation pinned");
        }

        #[test]
        fn export_round_trips() {
            let f = fixture();
            let file = f.manager.export(&conversation_id("2")).unwrap();
            assert_eq!(file.file_name, "Client Pricing Analysis.md");

            let parsed = ConversationExport::parse(&file.contents).unwrap();
            assert_eq!(parsed.title, "Client Pricing Analysis");
            assert_eq!(parsed.tags, vec!["pricing", "business"]);
            assert_eq!(parsed.message_count, 8);
        }

        #[test]
        fn share_builds_public_link() {
            let f = fixture();
            let link = f
                .manager
                .share("https://app.example.com/", &conversation_id("3"))
                .unwrap();
            assert_eq!(link, "https://app.example.com/shared/conversations/3");
        }

        #[test]
        fn queries_cover_library() {
            let f = fixture();
            assert_eq!(f.manager.filter_by_tag("pricing").len(), 1);
            assert_eq!(f.manager.search("MARKETING").len(), 1);
            let stats = f.manager.stats();
            assert_eq!(stats.total_conversations, 3);
            assert_eq!(stats.total_messages, 35);
            assert_eq!(stats.avg_messages_per_conversation, 12);
        }
    }
}
