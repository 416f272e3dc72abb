//! Conversation domain - messages, the active store and the saved library.

mod library;
mod message;
mod prompts;
mod store;

pub use library::{
    normalize_tags, normalize_title, Bookmark, Conversation, ConversationFilter,
    ConversationLibrary, ConversationPayload, ConversationStats, ConversationStatus,
    ConversationSummary, LibraryStats, PayloadMessage, UNTITLED,
};
pub use message::{
    Attachment, Author, Message, MessagePatch, MessageStatus, Rating, APOLOGY, MAX_SUGGESTIONS,
};
pub use prompts::{suggestions_for, QuickAction};
pub use store::{nearest_prior_user_message, ConversationStore, StoreError};
