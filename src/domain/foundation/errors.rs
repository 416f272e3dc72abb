//! Error types for the domain layer.

use thiserror::Error;

use super::{ConversationId, InsightId, MessageId};

/// Rejections raised before any state is touched.
///
/// Every operation validates its preconditions first; when one of these is
/// returned the conversation, insight list and library are unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("a request is already in flight")]
    RequestInFlight,

    #[error("no user message precedes message {0}")]
    NoPriorUserMessage(MessageId),

    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("message {0} was not written by the assistant")]
    NotAssistantMessage(MessageId),

    #[error("message {0} is still pending")]
    MessagePending(MessageId),

    #[error("insight not found: {0}")]
    InsightNotFound(InsightId),

    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("nothing to save: the conversation has no messages")]
    NothingToSave,

    #[error("unknown model '{0}'")]
    UnknownModel(String),
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Short title used when the rejection is surfaced to the user.
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::EmptyField { .. } => "Missing value",
            ValidationError::EmptyPrompt => "Nothing to send",
            ValidationError::RequestInFlight => "Please wait",
            ValidationError::NoPriorUserMessage(_) => "Cannot regenerate",
            ValidationError::MessageNotFound(_) => "Message not found",
            ValidationError::NotAssistantMessage(_) => "Not an assistant response",
            ValidationError::MessagePending(_) => "Response still loading",
            ValidationError::InsightNotFound(_) => "Insight not found",
            ValidationError::ConversationNotFound(_) => "Conversation not found",
            ValidationError::NothingToSave => "Nothing to save",
            ValidationError::UnknownModel(_) => "Unknown model",
        }
    }
}
