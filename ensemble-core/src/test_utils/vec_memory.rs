//! VecMemory — unbounded in-memory message log.

use crate::chat::{ChatMemory, ChatMessage};
use std::sync::Mutex;

/// A message log that keeps everything. Tests that care about eviction
/// should use a bounded implementation instead.
#[derive(Default)]
pub struct VecMemory {
    messages: Mutex<Vec<ChatMessage>>,
}

impl VecMemory {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChatMemory for VecMemory {
    fn append(&self, message: ChatMessage) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message);
    }

    fn messages(&self) -> Vec<ChatMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
