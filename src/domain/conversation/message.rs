//! Chat messages and in-place patches.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp};

/// Upper bound on follow-up suggestions attached to one message.
pub const MAX_SUGGESTIONS: usize = 4;

/// Content substituted into an assistant placeholder when generation fails.
pub const APOLOGY: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

/// Where a message is in its lifecycle.
///
/// `Sent` belongs to user messages. Assistant messages start `Pending` and
/// end `Settled` or `Failed`; regenerate cycles `Settled -> Pending -> Settled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sent,
    Pending,
    #[default]
    Settled,
    Failed,
}

/// Thumbs up or down on an assistant response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Up,
    Down,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Up => "up",
            Rating::Down => "down",
        }
    }
}

/// A file referenced by a user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub reference: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: reference.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    #[serde(alias = "type")]
    pub author: Author,
    #[serde(alias = "created_at")]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

impl Message {
    fn build(author: Author, content: String, status: MessageStatus) -> Self {
        Self {
            id: MessageId::new(),
            content,
            author,
            timestamp: Timestamp::now(),
            status,
            suggestions: Vec::new(),
            attachments: Vec::new(),
            rating: None,
        }
    }

    /// A user message, marked `Sent` as soon as it is created.
    pub fn user(content: impl Into<String>) -> Self {
        Self::build(Author::User, content.into(), MessageStatus::Sent)
    }

    /// A settled assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::build(Author::Assistant, content.into(), MessageStatus::Settled)
    }

    /// An empty assistant placeholder awaiting the gateway.
    pub fn pending_assistant() -> Self {
        Self::build(Author::Assistant, String::new(), MessageStatus::Pending)
    }

    /// Attaches follow-up suggestions, keeping at most [`MAX_SUGGESTIONS`].
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = cap_suggestions(suggestions);
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }

    pub fn is_assistant(&self) -> bool {
        self.author == Author::Assistant
    }

    /// Applies every field present in `patch`. The id never changes.
    pub fn apply(&mut self, patch: MessagePatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(timestamp) = patch.timestamp {
            self.timestamp = timestamp;
        }
        if let Some(suggestions) = patch.suggestions {
            self.suggestions = suggestions;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
    }
}

fn cap_suggestions<I, S>(suggestions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    suggestions
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(Into::into)
        .collect()
}

/// A partial update to a message. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub status: Option<MessageStatus>,
    pub timestamp: Option<Timestamp>,
    pub suggestions: Option<Vec<String>>,
    /// `Some(None)` clears the rating.
    pub rating: Option<Option<Rating>>,
}

impl MessagePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = Some(cap_suggestions(suggestions));
        self
    }

    pub fn rating(mut self, rating: Option<Rating>) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Settles a placeholder with generated content.
    pub fn settled(content: impl Into<String>) -> Self {
        Self::new()
            .content(content)
            .status(MessageStatus::Settled)
            .timestamp(Timestamp::now())
    }

    /// Marks a placeholder failed with the fixed apology.
    pub fn failed() -> Self {
        Self::new()
            .content(APOLOGY)
            .status(MessageStatus::Failed)
            .timestamp(Timestamp::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_author_and_status() {
        assert_eq!(Message::user("hi").status, MessageStatus::Sent);
        assert!(Message::user("hi").is_user());
        assert!(Message::pending_assistant().is_pending());
        assert!(Message::pending_assistant().content.is_empty());
        assert_eq!(Message::assistant("ok").status, MessageStatus::Settled);
    }

    #[test]
    fn suggestions_are_capped() {
        let msg = Message::assistant("ok").with_suggestions(["a", "b", "c", "d", "e"]);
        assert_eq!(msg.suggestions, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn apply_keeps_id_and_untouched_fields() {
        let mut msg = Message::assistant("old").with_suggestions(["x"]);
        let id = msg.id;
        msg.apply(MessagePatch::new().content("new"));
        assert_eq!(msg.id, id);
        assert_eq!(msg.content, "new");
        assert_eq!(msg.suggestions, vec!["x"]);
    }

    #[test]
    fn rating_patch_can_clear() {
        let mut msg = Message::assistant("ok");
        msg.apply(MessagePatch::new().rating(Some(Rating::Up)));
        assert_eq!(msg.rating, Some(Rating::Up));
        msg.apply(MessagePatch::new().rating(None));
        assert_eq!(msg.rating, None);
    }

    #[test]
    fn failed_patch_uses_apology() {
        let mut msg = Message::pending_assistant();
        msg.apply(MessagePatch::failed());
        assert_eq!(msg.content, APOLOGY);
        assert_eq!(msg.status, MessageStatus::Failed);
    }

    #[test]
    fn remote_message_shape_deserializes() {
        let json = r#"{
            "id": "6a2f41a3-c54c-fce8-32d2-0324e1c32e22",
            "content": "hello",
            "type": "assistant",
            "created_at": "2026-01-01T00:00:00Z"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(msg.is_assistant());
        assert_eq!(msg.status, MessageStatus::Settled);
        assert!(msg.rating.is_none());
    }
}
