//! Foundation value objects shared by every other domain module.

mod errors;
mod identity;
mod ids;
mod text;
mod timestamp;

pub use errors::ValidationError;
pub use identity::Identity;
pub use ids::{ConversationId, InsightId, MessageId, UserId};
pub use text::{collapse_whitespace, truncate_chars};
pub use timestamp::Timestamp;
