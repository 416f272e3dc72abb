//! The ordered message sequence of the active conversation.

use std::collections::HashSet;

use thiserror::Error;

use super::message::{Message, MessagePatch};
use crate::domain::foundation::MessageId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("message id already present: {0}")]
    DuplicateId(MessageId),

    #[error("message not found: {0}")]
    NotFound(MessageId),
}

/// Holds the messages of the conversation currently on screen.
///
/// The store preserves insertion order and id uniqueness. Keeping at most one
/// message pending is the caller's job; [`ConversationStore::has_pending`]
/// is the guard it checks.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with `messages`. Later duplicates of an id are dropped.
    pub fn with_messages(messages: Vec<Message>) -> Self {
        let mut store = Self::new();
        store.reset_to(messages);
        store
    }

    pub fn append(&mut self, message: Message) -> Result<(), StoreError> {
        if self.position(&message.id).is_some() {
            return Err(StoreError::DuplicateId(message.id));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Patches a message in place and returns the updated value.
    pub fn replace(&mut self, id: &MessageId, patch: MessagePatch) -> Result<&Message, StoreError> {
        let index = self.position(id).ok_or(StoreError::NotFound(*id))?;
        self.messages[index].apply(patch);
        Ok(&self.messages[index])
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Replaces the whole sequence.
    pub fn reset_to(&mut self, messages: Vec<Message>) {
        let mut seen = HashSet::with_capacity(messages.len());
        let before = messages.len();
        self.messages = messages
            .into_iter()
            .filter(|m| seen.insert(m.id))
            .collect();
        if self.messages.len() != before {
            tracing::warn!(
                dropped = before - self.messages.len(),
                "duplicate message ids dropped on reset"
            );
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        self.messages.iter().any(Message::is_pending)
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pending()).count()
    }

    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.is_user())
    }

    /// (user, assistant) message counts.
    pub fn author_counts(&self) -> (usize, usize) {
        let users = self.messages.iter().filter(|m| m.is_user()).count();
        (users, self.messages.len() - users)
    }

    fn position(&self, id: &MessageId) -> Option<usize> {
        self.messages.iter().position(|m| &m.id == id)
    }
}

/// Scans backward from `from` for the closest earlier user message.
///
/// Returns `None` when `from` is absent or nothing before it was written by
/// the user.
pub fn nearest_prior_user_message<'a>(
    messages: &'a [Message],
    from: &MessageId,
) -> Option<&'a Message> {
    let index = messages.iter().position(|m| &m.id == from)?;
    messages[..index].iter().rev().find(|m| m.is_user())
}
