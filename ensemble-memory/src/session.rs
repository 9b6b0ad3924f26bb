//! SessionMemory — session-keyed windowed message logs.

use ensemble_core::{ChatMessage, SessionId};
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

/// A store of independent message windows, one per session id.
///
/// Each session keeps the most recent `max_messages` entries; sessions never
/// see each other's messages. `evict` drops a whole session — a supervisor
/// evicts its planning session when its loop exits.
pub struct SessionMemory {
    max_messages: usize,
    sessions: RwLock<HashMap<SessionId, VecDeque<ChatMessage>>>,
}

impl SessionMemory {
    /// Store with the default per-session window.
    pub fn new() -> Self {
        Self::with_max_messages(crate::WindowMemory::DEFAULT_WINDOW)
    }

    /// Store retaining at most `max_messages` entries per session.
    pub fn with_max_messages(max_messages: usize) -> Self {
        Self {
            max_messages,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Configured per-session window size.
    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Append one message to a session's log, evicting its oldest entries
    /// past the window.
    pub fn append(&self, session: &SessionId, message: ChatMessage) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let log = sessions.entry(session.clone()).or_default();
        log.push_back(message);
        while log.len() > self.max_messages {
            log.pop_front();
        }
    }

    /// Snapshot of a session's log, oldest first. Empty for an unknown
    /// session.
    pub fn messages(&self, session: &SessionId) -> Vec<ChatMessage> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions
            .get(session)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Empty a session's log without forgetting the session.
    pub fn clear(&self, session: &SessionId) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        if let Some(log) = sessions.get_mut(session) {
            log.clear();
        }
    }

    /// Drop a session entirely.
    pub fn evict(&self, session: &SessionId) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.remove(session);
    }

    /// Whether the store is tracking this session.
    pub fn has_session(&self, session: &SessionId) -> bool {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions.contains_key(session)
    }

    /// Number of sessions currently tracked.
    pub fn session_count(&self) -> usize {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions.len()
    }

    /// Whether no sessions are currently tracked.
    pub fn is_empty(&self) -> bool {
        self.session_count() == 0
    }
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::new()
    }
}
