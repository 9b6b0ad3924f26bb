//! Linear composition: run executors in declaration order over one board.

use async_trait::async_trait;
use ensemble_core::{
    Agent, AgentExecutor, AgentName, AgentSpec, Blackboard, BoardBinding, BoxError, InvokeError,
};
use serde_json::Value;
use std::fmt;

/// Runs its steps in order against one shared board.
///
/// Each step reads its arguments from the board and may write results back
/// through its own output binding, so later steps see everything earlier
/// steps produced. The sequence result is the state value under
/// [`output_key`](SequenceAgent::output_key) when one is configured,
/// otherwise the last step's response.
///
/// A sequence is itself a workflow-variant [`Agent`]: composed inside
/// another pipeline it adopts the outer board, and the state-map argument
/// it receives is merged into that board before the first step runs.
pub struct SequenceAgent {
    steps: Vec<AgentExecutor>,
    output_key: Option<String>,
    binding: BoardBinding,
}

impl SequenceAgent {
    /// An empty sequence. Running it without steps yields `Value::Null`.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            output_key: None,
            binding: BoardBinding::new(),
        }
    }

    /// Appends one step.
    #[must_use]
    pub fn step(mut self, executor: AgentExecutor) -> Self {
        self.steps.push(executor);
        self
    }

    /// State key the sequence reads its result from.
    #[must_use]
    pub fn output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the sequence has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order over `board` and returns the result.
    pub async fn run_on(&self, board: &Blackboard) -> Result<Value, InvokeError> {
        let mut response = Value::Null;
        for step in &self.steps {
            response = step.invoke(board).await?;
            tracing::debug!(step = %step.name(), "ensemble.workflow.step");
        }
        Ok(self.result(board, response))
    }

    /// Runs on a fresh board (or the adopted one, when composed).
    pub async fn run(&self) -> Result<Value, InvokeError> {
        self.run_on(&self.binding.bound_or_new()).await
    }

    /// Wraps this sequence as a registrable workflow step.
    pub fn into_executor(
        self,
        name: impl Into<AgentName>,
        description: impl Into<String>,
    ) -> AgentExecutor {
        let mut spec = AgentSpec::workflow(name, description);
        if let Some(key) = &self.output_key {
            spec = spec.with_output(key.clone());
        }
        AgentExecutor::new(spec, self)
    }

    fn result(&self, board: &Blackboard, last_response: Value) -> Value {
        match &self.output_key {
            Some(key) => board.read_or(key, Value::Null),
            None => last_response,
        }
    }
}

impl Default for SequenceAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SequenceAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceAgent")
            .field("steps", &self.steps.len())
            .field("output_key", &self.output_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Agent for SequenceAgent {
    async fn call(&self, arguments: Vec<Value>) -> Result<Value, BoxError> {
        let board = self.binding.bound_or_new();
        if let Some(Value::Object(state)) = arguments.into_iter().next() {
            board.write_all(state);
        }
        Ok(self.run_on(&board).await?)
    }

    fn bind_board(&self, board: &Blackboard) -> bool {
        self.binding.bind(board.clone());
        true
    }
}
