//! Typed ID wrappers for agent, board, conversation, and session identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers prevent mixing up agent names, board ids, etc.
/// These are just strings underneath — no format requirement. The protocol
/// doesn't care what your IDs look like; `generate` mints a uuid when you
/// don't care either.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

typed_id!(AgentName, "Registered name of an agent, unique within a registry.");
typed_id!(BoardId, "Identity of one execution blackboard.");
typed_id!(ConversationId, "Identity of one logical conversation.");
typed_id!(SessionId, "Identity of one conversation-memory session.");

impl BoardId {
    /// Mint a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl ConversationId {
    /// Mint a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl SessionId {
    /// Mint a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types_over_plain_strings() {
        let name = AgentName::from("scoreStyle");
        assert_eq!(name.as_str(), "scoreStyle");
        assert_eq!(name.to_string(), "scoreStyle");
        assert_eq!(AgentName::new(String::from("scoreStyle")), name);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(BoardId::generate(), BoardId::generate());
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = BoardId::from("board-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"board-1\"");
        let back: BoardId = serde_json::from_str("\"board-1\"").unwrap();
        assert_eq!(back, id);
    }
}
