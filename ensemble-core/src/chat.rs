//! Conversation primitives: role-tagged messages, the message-log contract,
//! and the conversation state used by the guarded directive protocol.

use crate::id::ConversationId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, RwLock};

/// Textual rendering of an agent response: strings verbatim, every other
/// value as compact JSON.
pub fn response_text(response: &Value) -> String {
    match response {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Speaker role of one conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Instructions from the composing application.
    System,
    /// A human or upstream-caller turn.
    User,
    /// A model or agent turn.
    Assistant,
}

/// One role-tagged conversation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker role.
    pub role: MessageRole,
    /// Message text.
    pub text: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            text: text.into(),
        }
    }

    /// Build a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }

    /// Build an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
        }
    }
}

/// Ordered message log contract.
///
/// Implementations are internally synchronized — one handle may be shared
/// between an agent and the supervisor that injected it. Eviction policy
/// (if any) belongs to the implementation.
pub trait ChatMemory: Send + Sync {
    /// Append one message.
    fn append(&self, message: ChatMessage);

    /// Snapshot of the log, oldest first.
    fn messages(&self) -> Vec<ChatMessage>;

    /// Remove every message.
    fn clear(&self);
}

/// Conversation-scoped state: an id, a shared message log, and a scratch
/// map guard hooks use to carry routing decisions across calls.
///
/// Cheap to clone; clones share the same log and scratch map. Distinct from
/// [`Blackboard`](crate::Blackboard): a conversation outlives any single
/// execution and never records invocations.
#[derive(Clone)]
pub struct Conversation {
    inner: Arc<ConversationInner>,
}

struct ConversationInner {
    id: ConversationId,
    log: Arc<dyn ChatMemory>,
    scratch: RwLock<Map<String, Value>>,
}

impl Conversation {
    /// Open a conversation over the given message log.
    pub fn new(id: impl Into<ConversationId>, log: Arc<dyn ChatMemory>) -> Self {
        Self {
            inner: Arc::new(ConversationInner {
                id: id.into(),
                log,
                scratch: RwLock::new(Map::new()),
            }),
        }
    }

    /// Conversation identity.
    pub fn id(&self) -> &ConversationId {
        &self.inner.id
    }

    /// Append to the message log.
    pub fn append(&self, message: ChatMessage) {
        self.inner.log.append(message);
    }

    /// Snapshot of the message log, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.log.messages()
    }

    /// Write one scratch entry (last write wins).
    pub fn write(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut scratch = self
            .inner
            .scratch
            .write()
            .unwrap_or_else(|e| e.into_inner());
        scratch.insert(key.into(), value.into());
    }

    /// Read one scratch entry.
    pub fn read(&self, key: &str) -> Option<Value> {
        let scratch = self.inner.scratch.read().unwrap_or_else(|e| e.into_inner());
        scratch.get(key).cloned()
    }

    /// Whether a scratch entry exists.
    pub fn has(&self, key: &str) -> bool {
        let scratch = self.inner.scratch.read().unwrap_or_else(|e| e.into_inner());
        scratch.contains_key(key)
    }
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}
