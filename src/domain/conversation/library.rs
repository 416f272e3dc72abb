//! Saved conversations, their library and the payloads that create them.

use serde::{Deserialize, Serialize};

use super::message::{Author, Message};
use crate::domain::foundation::{
    collapse_whitespace, truncate_chars, ConversationId, MessageId, Timestamp,
};

/// Title used when a conversation's title normalizes to nothing.
pub const UNTITLED: &str = "Untitled conversation";

/// A conversation as listed in the library.
///
/// `message_count` is the size of the snapshot at its last save, not the
/// live count of the store. Title and tags are normalized however the value
/// is built, deserialization included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawConversation")]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    #[serde(default)]
    pub preview: String,
    pub last_activity: Timestamp,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub message_count: usize,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub archived: bool,
}

/// Wire shape of [`Conversation`], before normalization.
#[derive(Deserialize)]
struct RawConversation {
    id: ConversationId,
    title: String,
    #[serde(default)]
    preview: String,
    last_activity: Timestamp,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    message_count: usize,
    #[serde(default)]
    pinned: bool,
    #[serde(default)]
    archived: bool,
}

impl From<RawConversation> for Conversation {
    fn from(raw: RawConversation) -> Self {
        Self {
            id: raw.id,
            title: normalize_title(&raw.title),
            preview: raw.preview,
            last_activity: raw.last_activity,
            tags: normalize_tags(&raw.tags),
            message_count: raw.message_count,
            pinned: raw.pinned,
            archived: raw.archived,
        }
    }
}

impl Conversation {
    pub fn new(
        id: ConversationId,
        title: &str,
        preview: impl Into<String>,
        last_activity: Timestamp,
    ) -> Self {
        Self {
            id,
            title: normalize_title(title),
            preview: preview.into(),
            last_activity,
            tags: Vec::new(),
            message_count: 0,
            pinned: false,
            archived: false,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn with_message_count(mut self, count: usize) -> Self {
        self.message_count = count;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = normalize_tag(tag);
        self.tags.iter().any(|t| *t == wanted)
    }

    /// Case-insensitive match over title and preview.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.preview.to_lowercase().contains(&query)
    }
}

fn strip_controls(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect()
}

/// Single-line title with whitespace runs collapsed and control characters
/// removed.
pub fn normalize_title(title: &str) -> String {
    let title = collapse_whitespace(&strip_controls(title));
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

/// One tag as a single lowercase line. Commas act as spaces, since the
/// export lists tags comma-separated.
fn normalize_tag(tag: &str) -> String {
    collapse_whitespace(&strip_controls(&tag.replace(',', " "))).to_lowercase()
}

/// Normalized, de-duplicated, non-empty tags in first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = normalize_tag(tag.as_ref());
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Which conversations a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Active,
    Archived,
    All,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Active => "active",
            ConversationStatus::Archived => "archived",
            ConversationStatus::All => "all",
        }
    }

    pub fn admits(&self, conversation: &Conversation) -> bool {
        match self {
            ConversationStatus::Active => !conversation.archived,
            ConversationStatus::Archived => conversation.archived,
            ConversationStatus::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationFilter {
    pub status: ConversationStatus,
}

impl ConversationFilter {
    pub fn active() -> Self {
        Self {
            status: ConversationStatus::Active,
        }
    }
}

/// What the source of truth returns after creating a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: Timestamp,
}

/// One message inside a save payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadMessage {
    pub role: Author,
    pub content: String,
}

/// Everything needed to create a durable conversation from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPayload {
    pub title: String,
    pub preview: String,
    pub model: String,
    pub tags: Vec<String>,
    pub message_count: usize,
    pub messages: Vec<PayloadMessage>,
}

impl ConversationPayload {
    /// Longest title derived from the first user message.
    pub const TITLE_LIMIT: usize = 50;
    /// Longest preview derived from the first user message.
    pub const PREVIEW_LIMIT: usize = 100;

    /// Snapshots `messages` into a payload.
    ///
    /// Title and preview come from the first user message; `fallback_title`
    /// is used when there is none.
    pub fn snapshot<I, S>(messages: &[Message], model: &str, tags: I, fallback_title: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let first_user = messages.iter().find(|m| m.is_user());
        let title = first_user
            .map(|m| truncate_chars(&collapse_whitespace(&m.content), Self::TITLE_LIMIT))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| fallback_title.to_string());
        let preview = first_user
            .map(|m| truncate_chars(&m.content, Self::PREVIEW_LIMIT))
            .unwrap_or_default();

        Self {
            title: normalize_title(&title),
            preview,
            model: model.to_string(),
            tags: normalize_tags(tags),
            message_count: messages.len(),
            messages: messages
                .iter()
                .map(|m| PayloadMessage {
                    role: m.author,
                    content: m.content.clone(),
                })
                .collect(),
        }
    }

    /// The library entry for this payload once `summary` has been assigned.
    pub fn into_conversation(self, summary: &ConversationSummary) -> Conversation {
        Conversation {
            id: summary.id.clone(),
            title: normalize_title(&summary.title),
            preview: self.preview,
            last_activity: summary.created_at,
            tags: normalize_tags(&summary.tags),
            message_count: self.message_count,
            pinned: false,
            archived: false,
        }
    }
}

/// Aggregate counters kept by the source of truth.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationStats {
    pub total_conversations: u64,
    pub total_messages: u64,
    pub total_tokens: u64,
    #[serde(default)]
    pub avg_rating: Option<f64>,
}

/// A message saved for later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub message_id: MessageId,
    pub author: Author,
    pub excerpt: String,
    pub created_at: Timestamp,
}

impl Bookmark {
    pub const EXCERPT_LIMIT: usize = 100;

    pub fn of(message: &Message) -> Self {
        Self {
            message_id: message.id,
            author: message.author,
            excerpt: truncate_chars(&message.content, Self::EXCERPT_LIMIT),
            created_at: Timestamp::now(),
        }
    }

    /// "Your message" or "AI response".
    pub fn label(&self) -> &'static str {
        match self.author {
            Author::User => "Your message",
            Author::Assistant => "AI response",
        }
    }
}

/// Counters shown over the conversation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LibraryStats {
    pub total_conversations: usize,
    pub total_messages: usize,
    pub avg_messages_per_conversation: usize,
}

/// The in-memory list of saved conversations, newest first.
#[derive(Debug, Clone, Default)]
pub struct ConversationLibrary {
    conversations: Vec<Conversation>,
}

impl ConversationLibrary {
    pub fn new(conversations: Vec<Conversation>) -> Self {
        Self { conversations }
    }

    pub fn all(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    pub fn replace_all(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
    }

    pub fn prepend(&mut self, conversation: Conversation) {
        self.conversations.insert(0, conversation);
    }

    /// Removes a conversation, returning it with its former index.
    pub fn remove(&mut self, id: &ConversationId) -> Option<(usize, Conversation)> {
        let index = self.conversations.iter().position(|c| &c.id == id)?;
        Some((index, self.conversations.remove(index)))
    }

    /// Puts a removed conversation back where it was.
    pub fn restore(&mut self, index: usize, conversation: Conversation) {
        let index = index.min(self.conversations.len());
        self.conversations.insert(index, conversation);
    }

    /// Flips the pinned flag, returning the new value.
    pub fn toggle_pin(&mut self, id: &ConversationId) -> Option<bool> {
        let conversation = self.conversations.iter_mut().find(|c| &c.id == id)?;
        conversation.pinned = !conversation.pinned;
        Some(conversation.pinned)
    }

    pub fn filter_by_tag(&self, tag: &str) -> Vec<&Conversation> {
        self.conversations.iter().filter(|c| c.has_tag(tag)).collect()
    }

    pub fn search(&self, query: &str) -> Vec<&Conversation> {
        self.conversations.iter().filter(|c| c.matches(query)).collect()
    }

    pub fn stats(&self) -> LibraryStats {
        let total_conversations = self.conversations.len();
        let total_messages: usize = self.conversations.iter().map(|c| c.message_count).sum();
        let avg_messages_per_conversation = if total_conversations == 0 {
            0
        } else {
            (total_messages as f64 / total_conversations as f64).round() as usize
        };
        LibraryStats {
            total_conversations,
            total_messages,
            avg_messages_per_conversation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(id: &str, title: &str, count: usize) -> Conversation {
        Conversation::new(ConversationId::new(id).unwrap(), title, "preview", Timestamp::now())
            .with_message_count(count)
    }

    #[test]
    fn title_is_single_line() {
        let c = conversation("1", "  Pricing\nstrategy \t review ", 0);
        assert_eq!(c.title, "Pricing strategy review");
        assert_eq!(conversation("2", " \n ", 0).title, UNTITLED);
    }

    #[test]
    fn tags_are_normalized() {
        let c = conversation("1", "t", 0).with_tags([" Pricing", "pricing", "", "Strategy "]);
        assert_eq!(c.tags, vec!["pricing", "strategy"]);
        assert!(c.has_tag("PRICING"));
    }

    #[test]
    fn tags_lose_commas_and_line_breaks() {
        let c = conversation("1", "t", 0).with_tags(["Q3, Q4", "a\nb", "x\u{7}y", ","]);
        assert_eq!(c.tags, vec!["q3 q4", "a b", "xy"]);
        assert!(c.has_tag("q3,q4"));
    }

    #[test]
    fn title_drops_control_characters() {
        assert_eq!(normalize_title("Client\u{0}  Pricing\r\n"), "Client Pricing");
    }

    #[test]
    fn deserialized_conversation_is_normalized() {
        let json = serde_json::json!({
            "id": "c-1",
            "title": "Client  Pricing",
            "last_activity": "2026-05-01T10:00:00Z",
            "tags": ["Pricing", "q3, q4", "pricing"]
        });
        let c: Conversation = serde_json::from_value(json).unwrap();
        assert_eq!(c.title, "Client Pricing");
        assert_eq!(c.tags, vec!["pricing", "q3 q4"]);
        assert_eq!(c.message_count, 0);
        assert!(!c.pinned);
    }

    #[test]
    fn search_is_case_insensitive() {
        let library = ConversationLibrary::new(vec![
            conversation("1", "Pricing Strategy", 2),
            conversation("2", "Client Onboarding", 2),
        ]);
        let hits = library.search("pricing");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "1");
    }

    #[test]
    fn stats_round_average() {
        let library = ConversationLibrary::new(vec![
            conversation("1", "a", 3),
            conversation("2", "b", 4),
        ]);
        let stats = library.stats();
        assert_eq!(stats.total_conversations, 2);
        assert_eq!(stats.total_messages, 7);
        assert_eq!(stats.avg_messages_per_conversation, 4);
        assert_eq!(ConversationLibrary::default().stats().avg_messages_per_conversation, 0);
    }

    #[test]
    fn remove_and_restore_keep_position() {
        let mut library = ConversationLibrary::new(vec![
            conversation("1", "a", 1),
            conversation("2", "b", 1),
            conversation("3", "c", 1),
        ]);
        let (index, removed) = library.remove(&ConversationId::new("2").unwrap()).unwrap();
        assert_eq!(index, 1);
        library.restore(index, removed);
        let ids: Vec<_> = library.all().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn toggle_pin_flips() {
        let mut library = ConversationLibrary::new(vec![conversation("1", "a", 1)]);
        let id = ConversationId::new("1").unwrap();
        assert_eq!(library.toggle_pin(&id), Some(true));
        assert_eq!(library.toggle_pin(&id), Some(false));
        assert_eq!(library.toggle_pin(&ConversationId::new("9").unwrap()), None);
    }

    #[test]
    fn snapshot_derives_title_and_preview() {
        let long = "x".repeat(120);
        let messages = vec![Message::assistant("hello"), Message::user(long.clone())];
        let payload = ConversationPayload::snapshot(&messages, "anthropic", ["AI"], "New Conversation");
        assert_eq!(payload.title.chars().count(), 50);
        assert_eq!(payload.preview.chars().count(), 100);
        assert_eq!(payload.message_count, 2);
        assert_eq!(payload.tags, vec!["ai"]);
        assert_eq!(payload.messages[1].role, Author::User);
    }

    #[test]
    fn snapshot_without_user_message_uses_fallback() {
        let messages = vec![Message::assistant("hello")];
        let payload = ConversationPayload::snapshot(&messages, "openai", Vec::<String>::new(), "New Conversation");
        assert_eq!(payload.title, "New Conversation");
        assert!(payload.preview.is_empty());
    }

    #[test]
    fn bookmark_excerpt_is_bounded() {
        let msg = Message::assistant("y".repeat(300));
        let bookmark = Bookmark::of(&msg);
        assert_eq!(bookmark.excerpt.chars().count(), 100);
        assert_eq!(bookmark.label(), "AI response");
    }
}
