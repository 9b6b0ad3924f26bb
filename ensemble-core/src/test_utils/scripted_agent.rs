//! ScriptedAgent — replays a queue of canned replies and records every call.

use crate::blackboard::Blackboard;
use crate::chat::ChatMemory;
use crate::error::BoxError;
use crate::executor::{Agent, BoardBinding};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// An agent that pops one canned reply per call (`Null` once the script is
/// exhausted) and records the arguments it was called with. Optionally
/// adopts offered boards and message logs so tests can observe both sides
/// of the executor handshake.
pub struct ScriptedAgent {
    replies: Mutex<VecDeque<Value>>,
    calls: Mutex<Vec<Vec<Value>>>,
    invocations: AtomicUsize,
    binding: Option<BoardBinding>,
    memory: RwLock<Option<Arc<dyn ChatMemory>>>,
    accepts_memory: bool,
}

impl ScriptedAgent {
    /// Agent with no script; every call answers `Null`.
    pub fn new() -> Self {
        Self::replying(Vec::new())
    }

    /// Agent that answers the given replies in order.
    pub fn replying(replies: impl IntoIterator<Item = Value>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            invocations: AtomicUsize::new(0),
            binding: None,
            memory: RwLock::new(None),
            accepts_memory: false,
        }
    }

    /// Adopt boards offered by the executor into `binding`.
    pub fn adopting_boards(mut self, binding: BoardBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Accept injected message logs; the last one is observable through
    /// [`memory`](ScriptedAgent::memory).
    pub fn accepting_memory(mut self) -> Self {
        self.accepts_memory = true;
        self
    }

    /// Number of completed calls.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Arguments of every call, in call order.
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The most recently injected message log, if any.
    pub fn memory(&self) -> Option<Arc<dyn ChatMemory>> {
        self.memory
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for ScriptedAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn call(&self, arguments: Vec<Value>) -> Result<Value, BoxError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(arguments);
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Value::Null);
        Ok(reply)
    }

    fn bind_board(&self, board: &Blackboard) -> bool {
        match &self.binding {
            Some(binding) => {
                binding.bind(board.clone());
                true
            }
            None => false,
        }
    }

    fn inject_memory(&self, memory: Arc<dyn ChatMemory>) -> bool {
        if !self.accepts_memory {
            return false;
        }
        let mut slot = self.memory.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(memory);
        true
    }
}
