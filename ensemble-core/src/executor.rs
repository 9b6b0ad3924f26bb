//! The invocation pipeline: the [`Agent`] contract, the [`AgentExecutor`]
//! that drives one call end to end, and the [`AgentRegistry`] executors are
//! looked up in.
//!
//! One invocation always runs the same steps, in order: offer the board to
//! the agent, marshal arguments from board state, call the agent, write the
//! output binding, append the ledger record, return the response. State
//! writes happen even when nobody reads them; the ledger grows even when
//! the call is part of a larger composition.

use crate::agent::AgentSpec;
use crate::blackboard::Blackboard;
use crate::chat::ChatMemory;
use crate::error::{BoxError, InvokeError};
use crate::id::AgentName;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A callable unit of work.
///
/// Most agents are plain wrappers around a function or a model call and
/// implement only [`call`](Agent::call). Composed agents (sequences, loops,
/// supervisors) additionally accept the caller's board in
/// [`bind_board`](Agent::bind_board) so that nested invocations share one
/// state map and ledger, and conversational agents accept a fresh message
/// window in [`inject_memory`](Agent::inject_memory).
#[async_trait]
pub trait Agent: Send + Sync {
    /// Run the agent against already-marshaled arguments.
    async fn call(&self, arguments: Vec<Value>) -> Result<Value, BoxError>;

    /// Offer the caller's board before marshaling. Return `true` to adopt
    /// it for the coming call; the default declines.
    fn bind_board(&self, board: &Blackboard) -> bool {
        let _ = board;
        false
    }

    /// Offer a message log before the call. Return `true` to adopt it; the
    /// default declines.
    fn inject_memory(&self, memory: Arc<dyn ChatMemory>) -> bool {
        let _ = memory;
        false
    }
}

/// Board slot a composed agent adopts its caller's board through.
///
/// Cheap to clone; clones share the slot. [`bound_or_new`] is what the
/// composed agent's `call` starts from: the caller's board when one was
/// offered, a fresh board when the agent runs top-level.
///
/// [`bound_or_new`]: BoardBinding::bound_or_new
#[derive(Clone, Default)]
pub struct BoardBinding {
    slot: Arc<RwLock<Option<Blackboard>>>,
}

impl BoardBinding {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a board in the slot, replacing any previous one.
    pub fn bind(&self, board: Blackboard) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(board);
    }

    /// The currently bound board, if any.
    pub fn bound(&self) -> Option<Blackboard> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.clone()
    }

    /// The bound board, or a fresh one when the slot is empty.
    pub fn bound_or_new(&self) -> Blackboard {
        self.bound().unwrap_or_default()
    }
}

impl fmt::Debug for BoardBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("BoardBinding")
            .field("bound", &slot.as_ref().map(Blackboard::id))
            .finish()
    }
}

/// One agent plus its descriptor, ready to invoke against a board.
#[derive(Clone)]
pub struct AgentExecutor {
    spec: AgentSpec,
    agent: Arc<dyn Agent>,
}

impl AgentExecutor {
    /// Pair a descriptor with the agent it describes.
    pub fn new(spec: AgentSpec, agent: impl Agent + 'static) -> Self {
        Self {
            spec,
            agent: Arc::new(agent),
        }
    }

    /// The descriptor.
    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    /// Registered name, from the descriptor.
    pub fn name(&self) -> &AgentName {
        self.spec.name()
    }

    /// Offer a message log to the underlying agent; `true` when adopted.
    pub fn inject_memory(&self, memory: Arc<dyn ChatMemory>) -> bool {
        self.agent.inject_memory(memory)
    }

    /// Run one invocation against `board`.
    ///
    /// The board is offered to the agent first, so a composed agent marshals
    /// against the same state it will execute over. Arguments are marshaled
    /// from a snapshot of board state; concurrent writes land in the next
    /// invocation, not this one.
    pub async fn invoke(&self, board: &Blackboard) -> Result<Value, InvokeError> {
        self.agent.bind_board(board);

        let state = board.state();
        let arguments = self.spec.bind_args(&state)?;

        let response = self
            .agent
            .call(arguments.clone())
            .await
            .map_err(|source| InvokeError::Agent {
                agent: self.spec.name().clone(),
                source,
            })?;

        if let Some(key) = self.spec.output_key() {
            board.write(key, response.clone());
        }
        board.record_invocation(&self.spec, arguments, response.clone());

        Ok(response)
    }
}

impl fmt::Debug for AgentExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentExecutor")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// Name-keyed collection of executors.
///
/// Iteration order is by name, so [`cards`](AgentRegistry::cards) renders
/// the same catalog for the same registry every time.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentName, AgentExecutor>,
}

impl AgentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one executor under its descriptor's name, replacing any
    /// previous executor with that name.
    pub fn register(&mut self, executor: AgentExecutor) {
        self.agents.insert(executor.name().clone(), executor);
    }

    /// Look up an executor by name.
    pub fn get(&self, name: &str) -> Option<&AgentExecutor> {
        self.agents.get(name)
    }

    /// Number of registered executors.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Registered executors, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &AgentExecutor> {
        self.agents.values()
    }

    /// One catalog card per registered agent, one per line, ordered by name.
    pub fn cards(&self) -> String {
        self.agents
            .values()
            .map(|executor| executor.spec().card())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.agents.keys().collect::<Vec<_>>())
            .finish()
    }
}
