//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Unique identifier for a chat message.
///
/// Generated locally; never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random MessageId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a MessageId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Declares an opaque, non-empty string identifier.
///
/// Remote records arrive with ids the assistant does not mint itself, so these
/// stay strings rather than UUIDs.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new ", stringify!($name), ", returning error if empty.")]
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Builds an id from a literal known to be non-empty.
            #[allow(dead_code)]
            pub(crate) fn from_static(id: &'static str) -> Self {
                debug_assert!(!id.is_empty());
                Self(id.to_string())
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a saved conversation.
    ConversationId,
    "conversation_id"
);

string_id!(
    /// Identifier of a business insight.
    InsightId,
    "insight_id"
);

string_id!(
    /// User identifier (typically from auth provider).
    UserId,
    "user_id"
);

impl ConversationId {
    /// Mints an id for a conversation saved only on this device.
    pub fn local() -> Self {
        Self(format!("local-{}", Uuid::new_v4()))
    }

    /// True for ids minted by [`ConversationId::local`].
    pub fn is_local(&self) -> bool {
        self.0.starts_with("local-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_are_unique() {
        let a = MessageId::new();
        let b = MessageId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn message_id_round_trips_through_display() {
        let id = MessageId::new();
        let parsed: MessageId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn user_id_rejects_empty() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
        assert!(UserId::new("user-1").is_ok());
    }

    #[test]
    fn empty_conversation_id_names_its_field() {
        let err = ConversationId::new("").unwrap_err();
        assert_eq!(err, ValidationError::empty_field("conversation_id"));
    }

    #[test]
    fn local_conversation_ids_are_prefixed() {
        let id = ConversationId::local();
        assert!(id.is_local());
        assert!(!ConversationId::new("42").unwrap().is_local());
    }

    #[test]
    fn string_ids_serialize_transparently() {
        let id = InsightId::new("3").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"3\"");
    }
}
