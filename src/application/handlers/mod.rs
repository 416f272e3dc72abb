//! Command handlers, one per orchestration concern.

mod feedback;
mod insights;
mod library;
mod send_message;

pub use feedback::{FeedbackRecorder, RateOutcome, RegenerateOutcome};
pub use insights::{
    DismissOutcome, ImplementOutcome, InsightLifecycleManager, InsightReport, RefreshOutcome,
};
pub use library::{
    ConversationManager, ExportFile, LoadConversationOutcome, NewConversationOutcome,
    SaveOutcome, AUTO_SAVED_TAG, DEFAULT_TITLE,
};
pub use send_message::{
    GenerationOutcome, SendMessageCommand, SendMessageHandler, SendMessageResult,
};
