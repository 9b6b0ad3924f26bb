//! Shared execution blackboard: a key/value state map plus an append-only,
//! per-agent invocation ledger.

use crate::agent::AgentSpec;
use crate::id::{AgentName, BoardId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// State key the top-level request text is written under. Guarded calls and
/// supervisor runs both seed the board with it.
pub const REQUEST_KEY: &str = "request";

/// One completed agent invocation: the spec it ran under, the marshaled
/// input arguments, and the raw response. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    spec: AgentSpec,
    arguments: Vec<Value>,
    response: Value,
}

impl InvocationRecord {
    /// Record one completed invocation.
    pub fn new(spec: AgentSpec, arguments: Vec<Value>, response: Value) -> Self {
        Self {
            spec,
            arguments,
            response,
        }
    }

    /// The spec the agent ran under.
    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    /// Marshaled input arguments, in declaration order.
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// The raw response value.
    pub fn response(&self) -> &Value {
        &self.response
    }
}

/// Per-execution shared store.
///
/// The handle is cheap to clone; every clone views the same state map and
/// ledger. Single-key writes are last-writer-wins; no cross-key atomicity
/// is guaranteed. Create one board per top-level execution — the board is
/// dropped with its last handle, nothing persists.
#[derive(Debug, Clone)]
pub struct Blackboard {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    id: BoardId,
    state: RwLock<Map<String, Value>>,
    ledger: RwLock<HashMap<AgentName, Vec<InvocationRecord>>>,
}

impl Blackboard {
    /// Fresh empty board with a generated id.
    pub fn new() -> Self {
        Self::with_id(BoardId::generate())
    }

    /// Fresh empty board with a caller-chosen id.
    pub fn with_id(id: impl Into<BoardId>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: id.into(),
                state: RwLock::new(Map::new()),
                ledger: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Board identity.
    pub fn id(&self) -> &BoardId {
        &self.inner.id
    }

    /// Write one state entry (last write wins).
    pub fn write(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut state = self.inner.state.write().unwrap_or_else(|e| e.into_inner());
        state.insert(key.into(), value.into());
    }

    /// Write every entry of `entries` (last write wins per key).
    pub fn write_all(&self, entries: impl IntoIterator<Item = (String, Value)>) {
        let mut state = self.inner.state.write().unwrap_or_else(|e| e.into_inner());
        state.extend(entries);
    }

    /// Read one state entry.
    pub fn read(&self, key: &str) -> Option<Value> {
        let state = self.inner.state.read().unwrap_or_else(|e| e.into_inner());
        state.get(key).cloned()
    }

    /// Read one state entry, or `default` when absent.
    pub fn read_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.read(key).unwrap_or_else(|| default.into())
    }

    /// Snapshot of the entire state map.
    pub fn state(&self) -> Map<String, Value> {
        let state = self.inner.state.read().unwrap_or_else(|e| e.into_inner());
        state.clone()
    }

    /// Append an invocation record to the ledger under the spec's name.
    /// Ledger entries are never removed or reordered.
    pub fn record_invocation(&self, spec: &AgentSpec, arguments: Vec<Value>, response: Value) {
        let record = InvocationRecord::new(spec.clone(), arguments, response);
        let mut ledger = self.inner.ledger.write().unwrap_or_else(|e| e.into_inner());
        ledger.entry(spec.name().clone()).or_default().push(record);
    }

    /// Every invocation recorded under `name`, in call order. Empty when the
    /// agent never ran.
    pub fn invocations_for(&self, name: &str) -> Vec<InvocationRecord> {
        let ledger = self.inner.ledger.read().unwrap_or_else(|e| e.into_inner());
        ledger.get(name).cloned().unwrap_or_default()
    }
}

impl Default for Blackboard {
    fn default() -> Self {
        Self::new()
    }
}
