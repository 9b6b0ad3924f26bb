//! WindowMemory — a single bounded message log.

use ensemble_core::{ChatMemory, ChatMessage};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A message log that retains the most recent `max_messages` entries.
///
/// Suitable as the per-call memory injected into conversational agents and
/// as the planning-session log of a supervisor. A window of zero keeps
/// nothing; every append is evicted immediately.
pub struct WindowMemory {
    max_messages: usize,
    messages: Mutex<VecDeque<ChatMessage>>,
}

impl WindowMemory {
    /// Default window size.
    pub const DEFAULT_WINDOW: usize = 10;

    /// Log with the default window.
    pub fn new() -> Self {
        Self::with_max_messages(Self::DEFAULT_WINDOW)
    }

    /// Log retaining at most `max_messages` entries.
    pub fn with_max_messages(max_messages: usize) -> Self {
        Self {
            max_messages,
            messages: Mutex::new(VecDeque::new()),
        }
    }

    /// Configured window size.
    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Number of retained messages.
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

impl Default for WindowMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatMemory for WindowMemory {
    fn append(&self, message: ChatMessage) {
        let mut messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        messages.push_back(message);
        while messages.len() > self.max_messages {
            messages.pop_front();
        }
    }

    fn messages(&self) -> Vec<ChatMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
