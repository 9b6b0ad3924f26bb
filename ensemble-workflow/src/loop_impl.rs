//! Bounded iteration: repeat a step sequence until an exit condition holds.

use async_trait::async_trait;
use ensemble_core::{
    Agent, AgentExecutor, AgentName, AgentSpec, Blackboard, BoardBinding, BoxError, InvokeError,
};
use serde_json::Value;
use std::fmt;

/// Default ceiling on full passes per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Exit condition evaluated over the shared board.
pub type ExitCondition = dyn Fn(&Blackboard) -> bool + Send + Sync;

/// Repeats its steps, in order, until an exit condition holds.
///
/// The condition is tested after every single step invocation, not per
/// full pass, so a loop stops mid-pass the moment the board satisfies it.
/// Runs are bounded by [`max_iterations`](LoopAgent::max_iterations) full
/// passes; like the sequence, the result is the output-bound state value
/// when configured, else the last step's response.
///
/// A loop is a workflow-variant [`Agent`] and nests inside sequences and
/// other loops via [`into_executor`](LoopAgent::into_executor).
pub struct LoopAgent {
    steps: Vec<AgentExecutor>,
    exit: Box<ExitCondition>,
    max_iterations: usize,
    output_key: Option<String>,
    binding: BoardBinding,
}

impl LoopAgent {
    /// A loop that stops as soon as `exit` holds over the board.
    pub fn until(exit: impl Fn(&Blackboard) -> bool + Send + Sync + 'static) -> Self {
        Self {
            steps: Vec::new(),
            exit: Box::new(exit),
            max_iterations: DEFAULT_MAX_ITERATIONS,
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

    /// Ceiling on full passes.
    #[must_use]
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// State key the loop reads its result from.
    #[must_use]
    pub fn output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// Runs passes over `board` until the exit condition holds or the
    /// ceiling is hit.
    pub async fn run_on(&self, board: &Blackboard) -> Result<Value, InvokeError> {
        let mut response = Value::Null;
        'passes: for pass in 1..=self.max_iterations {
            for step in &self.steps {
                response = step.invoke(board).await?;
                if (self.exit)(board) {
                    tracing::debug!(pass, step = %step.name(), "ensemble.workflow.exit");
                    break 'passes;
                }
            }
        }
        Ok(self.result(board, response))
    }

    /// Runs on a fresh board (or the adopted one, when composed).
    pub async fn run(&self) -> Result<Value, InvokeError> {
        self.run_on(&self.binding.bound_or_new()).await
    }

    /// Wraps this loop as a registrable workflow step.
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

impl fmt::Debug for LoopAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopAgent")
            .field("steps", &self.steps.len())
            .field("max_iterations", &self.max_iterations)
            .field("output_key", &self.output_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Agent for LoopAgent {
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
