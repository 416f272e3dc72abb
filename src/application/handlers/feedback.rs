//! Feedback on individual messages: ratings, regeneration and bookmarks.

use std::sync::Arc;

use crate::application::persistence::{ChainOutcome, TierChain};
use crate::application::{AssistantError, ReconciliationPolicy};
use crate::domain::conversation::{
    nearest_prior_user_message, suggestions_for, Bookmark, ConversationStore, Message,
    MessagePatch, MessageStatus, Rating,
};
use crate::domain::foundation::{Identity, MessageId, ValidationError};
use crate::domain::notification::Notification;
use crate::domain::routing::{TaskRouter, TaskType};
use crate::ports::{DurableWrite, GenerationRequest, Notifier, ProviderGateway, WriteReceipt};

use super::send_message::GenerationOutcome;

#[derive(Debug, Clone, PartialEq)]
pub struct RateOutcome {
    pub message_id: MessageId,
    /// The rating the message carries after the call.
    pub rating: Option<Rating>,
    /// `None` when nothing was persisted because the user is anonymous.
    pub persistence: Option<ChainOutcome<WriteReceipt>>,
    pub reverted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegenerateOutcome {
    pub message_id: MessageId,
    pub task_type: TaskType,
    pub outcome: GenerationOutcome,
}

pub struct FeedbackRecorder {
    gateway: Arc<dyn ProviderGateway>,
    router: TaskRouter,
    chain: TierChain,
    notifier: Arc<dyn Notifier>,
    policy: ReconciliationPolicy,
}

/// Finds an assistant message that is settled enough to act on.
fn settled_assistant<'a>(
    store: &'a ConversationStore,
    message_id: &MessageId,
) -> Result<&'a Message, ValidationError> {
    let message = store
        .get(message_id)
        .ok_or(ValidationError::MessageNotFound(*message_id))?;
    if !message.is_assistant() {
        return Err(ValidationError::NotAssistantMessage(*message_id));
    }
    if message.is_pending() {
        return Err(ValidationError::MessagePending(*message_id));
    }
    Ok(message)
}

impl FeedbackRecorder {
    pub fn new(
        gateway: Arc<dyn ProviderGateway>,
        router: TaskRouter,
        chain: TierChain,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway,
            router,
            chain,
            notifier,
            policy: ReconciliationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReconciliationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Rates an assistant message. The last rating wins.
    ///
    /// The store is updated first. Only a known identity persists the
    /// rating; anonymous ratings stay in memory and touch no tier.
    pub async fn rate(
        &self,
        store: &mut ConversationStore,
        identity: &Identity,
        message_id: MessageId,
        rating: Rating,
    ) -> Result<RateOutcome, AssistantError> {
        let previous = settled_assistant(store, &message_id)?.rating;
        store.replace(&message_id, MessagePatch::new().rating(Some(rating)))?;

        if !identity.is_known() {
            tracing::debug!(message_id = %message_id, rating = rating.as_str(), "rating kept in memory");
            return Ok(RateOutcome {
                message_id,
                rating: Some(rating),
                persistence: None,
                reverted: false,
            });
        }

        let outcome = self
            .chain
            .write(identity, &DurableWrite::RateMessage { message_id, rating })
            .await;

        let reverted = self.policy.reverts(outcome.is_durable(), outcome.degraded());
        if reverted {
            store.replace(&message_id, MessagePatch::new().rating(previous))?;
        }
        if let Some(note) = outcome.failure_notification("Failed to save rating") {
            self.notifier.notify(note);
        }

        Ok(RateOutcome {
            message_id,
            rating: if reverted { previous } else { Some(rating) },
            persistence: Some(outcome),
            reverted,
        })
    }

    /// Regenerates an assistant message in place from the closest earlier
    /// user message, using `model`'s task type.
    ///
    /// The id never changes. A provider failure restores the previous
    /// content, status and timestamp.
    pub async fn regenerate(
        &self,
        store: &mut ConversationStore,
        identity: &Identity,
        message_id: MessageId,
        model: &str,
    ) -> Result<RegenerateOutcome, AssistantError> {
        if store.has_pending() {
            return Err(ValidationError::RequestInFlight.into());
        }
        let target = settled_assistant(store, &message_id)?;
        let (previous_content, previous_status, previous_timestamp) =
            (target.content.clone(), target.status, target.timestamp);
        let prompt = nearest_prior_user_message(store.messages(), &message_id)
            .map(|m| m.content.clone())
            .ok_or(ValidationError::NoPriorUserMessage(message_id))?;

        store.replace(&message_id, MessagePatch::new().status(MessageStatus::Pending))?;

        let task_type = self.router.map(model);
        let request = GenerationRequest::new(prompt.as_str(), task_type, identity.gateway_user());

        let outcome = match self.gateway.invoke(request).await {
            Ok(response) => {
                store.replace(
                    &message_id,
                    MessagePatch::settled(response.response_text).suggestions(suggestions_for(&prompt)),
                )?;
                tracing::info!(
                    message_id = %message_id,
                    provider = %response.metadata.provider,
                    tokens = response.metadata.tokens.total_tokens,
                    task_type = %task_type,
                    "response regenerated"
                );
                self.notifier.notify(
                    Notification::success("Response regenerated")
                        .with_description(response.metadata.summary()),
                );
                GenerationOutcome::Settled {
                    metadata: response.metadata,
                }
            }
            Err(error) => {
                store.replace(
                    &message_id,
                    MessagePatch::new()
                        .content(previous_content)
                        .status(previous_status)
                        .timestamp(previous_timestamp),
                )?;
                tracing::warn!(message_id = %message_id, error = %error, "regeneration failed");
                self.notifier.notify(
                    Notification::error("Failed to regenerate response")
                        .with_description(error.to_string()),
                );
                GenerationOutcome::Failed { error }
            }
        };

        Ok(RegenerateOutcome {
            message_id,
            task_type,
            outcome,
        })
    }

    /// Bookmarks any settled message through the tier chain.
    pub async fn bookmark(
        &self,
        store: &ConversationStore,
        identity: &Identity,
        message_id: MessageId,
    ) -> Result<ChainOutcome<WriteReceipt>, AssistantError> {
        let message = store
            .get(&message_id)
            .ok_or(ValidationError::MessageNotFound(message_id))?;
        if message.is_pending() {
            return Err(ValidationError::MessagePending(message_id).into());
        }

        let bookmark = Bookmark::of(message);
        let success = Notification::success("Message bookmarked").with_description(bookmark.label());
        let outcome = self
            .chain
            .write(identity, &DurableWrite::BookmarkMessage { bookmark })
            .await;
        self.notifier
            .notify(outcome.notification_or(success, "Failed to save bookmark"));
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::MockProviderGateway;
    use crate::adapters::local::InMemoryLocalStore;
    use crate::adapters::notify::RecordingNotifier;
    use crate::adapters::remote::{InMemoryRemoteStore, RemoteOperation};
    use crate::domain::foundation::UserId;
    use crate::domain::seed;
    use crate::ports::{ProviderError, TierKind};

    fn known() -> Identity {
        Identity::known(UserId::new("user-1").unwrap())
    }

    struct Fixture {
        gateway: MockProviderGateway,
        remote: Arc<InMemoryRemoteStore>,
        notifier: Arc<RecordingNotifier>,
        recorder: FeedbackRecorder,
        store: ConversationStore,
        ids: Vec<MessageId>,
    }

    fn fixture(gateway: MockProviderGateway) -> Fixture {
        let remote = Arc::new(InMemoryRemoteStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let chain = TierChain::builder().remote(remote.clone()).build();
        let recorder = FeedbackRecorder::new(
            Arc::new(gateway.clone()),
            TaskRouter::default(),
            chain,
            notifier.clone(),
        );
        let messages = vec![
            seed::greeting(),
            Message::user("How should I price a logo?"),
            Message::assistant("Charge by value."),
        ];
        let ids = messages.iter().map(|m| m.id).collect();
        Fixture {
            gateway,
            remote,
            notifier,
            recorder,
            store: ConversationStore::with_messages(messages),
            ids,
        }
    }

    mod rating {
        use super::*;

        #[tokio::test]
        async fn last_rating_wins() {
            let mut f = fixture(MockProviderGateway::new());
            let id = f.ids[2];

            f.recorder.rate(&mut f.store, &known(), id, Rating::Up).await.unwrap();
            f.recorder.rate(&mut f.store, &known(), id, Rating::Down).await.unwrap();

            assert_eq!(f.store.get(&id).unwrap().rating, Some(Rating::Down));
            assert_eq!(f.remote.rating_for(&id).await, Some(Rating::Down));
            assert_eq!(f.remote.rating_count().await, 1);
        }

        #[tokio::test]
        async fn anonymous_rating_is_memory_only() {
            let mut f = fixture(MockProviderGateway::new());
            let outcome = f
                .recorder
                .rate(&mut f.store, &Identity::Anonymous, f.ids[2], Rating::Up)
                .await
                .unwrap();

            assert!(outcome.persistence.is_none());
            assert_eq!(f.remote.call_count(), 0);
            assert_eq!(f.store.get(&f.ids[2]).unwrap().rating, Some(Rating::Up));
        }

        #[tokio::test]
        async fn user_message_cannot_be_rated() {
            let mut f = fixture(MockProviderGateway::new());
            let err = f
                .recorder
                .rate(&mut f.store, &known(), f.ids[1], Rating::Up)
                .await
                .unwrap_err();
            assert_eq!(
                err.as_validation(),
                Some(&ValidationError::NotAssistantMessage(f.ids[1]))
            );
            assert_eq!(f.store.get(&f.ids[1]).unwrap().rating, None);
        }

        #[tokio::test]
        async fn failed_rating_is_kept_by_default() {
            let mut f = fixture(MockProviderGateway::new());
            f.remote.fail(RemoteOperation::RateMessage).await;

            let outcome = f
                .recorder
                .rate(&mut f.store, &known(), f.ids[2], Rating::Up)
                .await
                .unwrap();

            assert!(!outcome.reverted);
            assert_eq!(outcome.persistence.unwrap().tier, TierKind::NoOp);
            assert_eq!(f.store.get(&f.ids[2]).unwrap().rating, Some(Rating::Up));
            assert!(f.notifier.has_failures());
        }

        #[tokio::test]
        async fn revert_policy_restores_previous_rating() {
            let mut f = fixture(MockProviderGateway::new());
            f.recorder = f.recorder.with_policy(ReconciliationPolicy::RevertOnFailure);
            f.recorder.rate(&mut f.store, &known(), f.ids[2], Rating::Up).await.unwrap();
            f.remote.fail(RemoteOperation::RateMessage).await;

            let outcome = f
                .recorder
                .rate(&mut f.store, &known(), f.ids[2], Rating::Down)
                .await
                .unwrap();

            assert!(outcome.reverted);
            assert_eq!(f.store.get(&f.ids[2]).unwrap().rating, Some(Rating::Up));
        }
    }

    mod regenerate {
        use super::*;

        #[tokio::test]
        async fn replaces_content_and_keeps_id() {
            let mut f = fixture(MockProviderGateway::new().with_response("Charge by scope."));
            let id = f.ids[2];

            let outcome = f
                .recorder
                .regenerate(&mut f.store, &known(), id, "openai")
                .await
                .unwrap();

            assert_eq!(outcome.task_type, TaskType::Creative);
            assert_eq!(f.store.len(), 3);
            let message = f.store.get(&id).unwrap();
            assert_eq!(message.content, "Charge by scope.");
            assert_eq!(message.status, MessageStatus::Settled);
            assert_eq!(
                f.gateway.last_call().unwrap().prompt,
                "How should I price a logo?"
            );
        }

        #[tokio::test]
        async fn greeting_only_conversation_has_no_prior_user_message() {
            let mut f = fixture(MockProviderGateway::new());
            let greeting = seed::greeting();
            let greeting_id = greeting.id;
            f.store.reset_to(vec![greeting]);
            let before = f.store.messages().to_vec();

            let err = f
                .recorder
                .regenerate(&mut f.store, &known(), greeting_id, "anthropic")
                .await
                .unwrap_err();

            assert_eq!(
                err.as_validation(),
                Some(&ValidationError::NoPriorUserMessage(greeting_id))
            );
            assert_eq!(f.store.messages(), before.as_slice());
            assert_eq!(f.gateway.call_count(), 0);
        }

        #[tokio::test]
        async fn provider_failure_restores_previous_content() {
            let mut f = fixture(
                MockProviderGateway::new().with_error(ProviderError::network("reset")),
            );
            let id = f.ids[2];
            let before = f.store.get(&id).unwrap().clone();

            let outcome = f
                .recorder
                .regenerate(&mut f.store, &known(), id, "anthropic")
                .await
                .unwrap();

            assert!(!outcome.outcome.is_settled());
            assert_eq!(f.store.get(&id).unwrap(), &before);
            assert!(f.notifier.has_failures());
        }
    }

    mod bookmark {
        use super::*;

        #[tokio::test]
        async fn anonymous_bookmark_lands_locally() {
            let local = Arc::new(InMemoryLocalStore::new());
            let mut f = fixture(MockProviderGateway::new());
            f.recorder.chain = TierChain::builder()
                .remote(f.remote.clone())
                .local(local.clone(), "assistant")
                .build();

            let outcome = f
                .recorder
                .bookmark(&f.store, &Identity::Anonymous, f.ids[2])
                .await
                .unwrap();

            assert_eq!(outcome.tier, TierKind::Local);
            assert_eq!(local.list("assistant.bookmarks").await.len(), 1);
            let note = f.notifier.last().unwrap();
            assert_eq!(note.description.as_deref(), Some("AI response"));
        }
    }
}
