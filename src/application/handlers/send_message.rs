//! SendMessage command handler.
//!
//! Appends the user's message and a pending assistant placeholder, routes the
//! selected model to a task type, invokes the provider gateway and settles
//! the placeholder with the response or the fixed apology.

use std::sync::Arc;

use crate::application::AssistantError;
use crate::domain::conversation::{suggestions_for, ConversationStore, Message, MessagePatch};
use crate::domain::foundation::{Identity, MessageId, ValidationError};
use crate::domain::notification::Notification;
use crate::domain::routing::{TaskRouter, TaskType};
use crate::ports::{GenerationMetadata, GenerationRequest, Notifier, ProviderError, ProviderGateway};

/// Command to send a prompt with the currently selected model.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub prompt: String,
    /// Model id picked by the user, e.g. `anthropic`.
    pub model: String,
    pub identity: Identity,
}

impl SendMessageCommand {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, identity: Identity) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            identity,
        }
    }
}

/// How the generation request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Settled { metadata: GenerationMetadata },
    Failed { error: ProviderError },
}

impl GenerationOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, GenerationOutcome::Settled { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendMessageResult {
    pub user_message_id: MessageId,
    pub assistant_message_id: MessageId,
    pub task_type: TaskType,
    pub outcome: GenerationOutcome,
}

pub struct SendMessageHandler {
    gateway: Arc<dyn ProviderGateway>,
    router: TaskRouter,
    notifier: Arc<dyn Notifier>,
}

impl SendMessageHandler {
    pub fn new(
        gateway: Arc<dyn ProviderGateway>,
        router: TaskRouter,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway,
            router,
            notifier,
        }
    }

    pub fn router(&self) -> &TaskRouter {
        &self.router
    }

    /// Handles a send.
    ///
    /// Validation happens before anything is appended. Once the placeholder
    /// is in the store the call always settles it, to content or to the
    /// apology, so the store never keeps a stale pending message.
    pub async fn handle(
        &self,
        store: &mut ConversationStore,
        cmd: SendMessageCommand,
    ) -> Result<SendMessageResult, AssistantError> {
        let prompt = cmd.prompt.trim();
        if prompt.is_empty() {
            return Err(ValidationError::EmptyPrompt.into());
        }
        if store.has_pending() {
            return Err(ValidationError::RequestInFlight.into());
        }

        let user_message = Message::user(prompt);
        let user_message_id = user_message.id;
        store.append(user_message)?;

        let placeholder = Message::pending_assistant();
        let assistant_message_id = placeholder.id;
        store.append(placeholder)?;

        let task_type = self.router.map(&cmd.model);
        let request = GenerationRequest::new(prompt, task_type, cmd.identity.gateway_user());

        let outcome = match self.gateway.invoke(request).await {
            Ok(response) => {
                let metadata = response.metadata;
                store.replace(
                    &assistant_message_id,
                    MessagePatch::settled(response.response_text).suggestions(suggestions_for(prompt)),
                )?;

                tracing::info!(
                    provider = %metadata.provider,
                    tokens = metadata.tokens.total_tokens,
                    cached = metadata.cached,
                    task_type = %task_type,
                    "assistant response settled"
                );
                self.notifier.notify(Notification::success(metadata.summary()));
                GenerationOutcome::Settled { metadata }
            }
            Err(error) => {
                store.replace(&assistant_message_id, MessagePatch::failed())?;

                tracing::warn!(error = %error, task_type = %task_type, "assistant response failed");
                self.notifier.notify(
                    Notification::error("Failed to get AI response").with_description(error.to_string()),
                );
                GenerationOutcome::Failed { error }
            }
        };

        Ok(SendMessageResult {
            user_message_id,
            assistant_message_id,
            task_type,
            outcome,
        })
    }
}
