//! The loop: plan a step, invoke an agent, fold the outcome back into the
//! planning dialogue, repeat until `done` or the cycle ceiling.

use crate::completion::CompletionError;
use crate::planner::{PlanDecision, Planner};
use crate::scorer::Scorer;
use async_trait::async_trait;
use ensemble_core::{
    Agent, AgentExecutor, AgentName, AgentRegistry, AgentSpec, Blackboard, BoardBinding, BoxError,
    ChatMemory, ChatMessage, InvokeError, MessageRole, ParamSpec, REQUEST_KEY, SessionId,
    response_text,
};
use ensemble_memory::{SessionMemory, WindowMemory};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Default ceiling on planning cycles per run.
pub const DEFAULT_MAX_INVOCATIONS: usize = 5;

/// Failure modes of a supervisor run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SupervisorError {
    /// The planner produced no usable decision.
    #[error("planner failed: {0}")]
    Planner(#[source] CompletionError),

    /// The scorer produced no usable grades.
    #[error("scorer failed: {0}")]
    Scorer(#[source] CompletionError),

    /// A planned agent invocation failed, or the planned agent does not
    /// exist.
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

/// An autonomous loop that answers one request by repeatedly consulting a
/// [`Planner`] and invoking registered agents over a shared board.
///
/// Each run works a private planning session: a windowed dialogue holding
/// the plan prompts, the decisions, and a digest of every invocation's
/// outcome. When a plan ends with a proposed final answer, a [`Scorer`]
/// arbitrates between it and the best response produced so far; the
/// proposal only wins on a strictly higher grade. Runs are bounded by
/// [`max_invocations`](SupervisorBuilder::max_invocations) cycles and a
/// ceiling hit is a normal exit with the last response, not an error.
///
/// A `Supervisor` is itself an [`Agent`] taking a single `request`
/// parameter, so [`into_executor`](Supervisor::into_executor) lets one
/// supervisor run as a step inside another composition.
pub struct Supervisor {
    registry: AgentRegistry,
    planner: Arc<dyn Planner>,
    scorer: Arc<dyn Scorer>,
    max_invocations: usize,
    memory_window: usize,
    output_key: Option<String>,
    sessions: Arc<SessionMemory>,
    binding: BoardBinding,
}

impl Supervisor {
    /// Starts a builder around the two required seams.
    pub fn builder(
        planner: impl Planner + 'static,
        scorer: impl Scorer + 'static,
    ) -> SupervisorBuilder {
        SupervisorBuilder {
            registry: AgentRegistry::new(),
            planner: Arc::new(planner),
            scorer: Arc::new(scorer),
            max_invocations: DEFAULT_MAX_INVOCATIONS,
            memory_window: WindowMemory::DEFAULT_WINDOW,
            output_key: None,
            sessions: None,
        }
    }

    /// The registered agents.
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Configured cycle ceiling.
    pub fn max_invocations(&self) -> usize {
        self.max_invocations
    }

    /// Answer `request` on a fresh board (or the adopted one, when this
    /// supervisor runs as a composed agent).
    pub async fn run(&self, request: impl Into<String>) -> Result<String, SupervisorError> {
        let board = self.binding.bound_or_new();
        board.write(REQUEST_KEY, request.into());
        self.execute(&board).await
    }

    /// Answer the request already seeded on `board` under
    /// [`REQUEST_KEY`], reading and writing shared state in place.
    pub async fn execute(&self, board: &Blackboard) -> Result<String, SupervisorError> {
        let session = SessionId::generate();
        let outcome = self.run_session(board, &session).await;
        self.sessions.evict(&session);
        let best = outcome?;
        if let Some(key) = &self.output_key {
            board.write(key.clone(), best.clone());
        }
        Ok(best)
    }

    /// Wraps this supervisor as a registrable step with a single `request`
    /// parameter.
    pub fn into_executor(
        self,
        name: impl Into<AgentName>,
        description: impl Into<String>,
    ) -> AgentExecutor {
        let mut spec =
            AgentSpec::simple(name, description).with_param(ParamSpec::text(REQUEST_KEY));
        if let Some(key) = &self.output_key {
            spec = spec.with_output(key.clone());
        }
        AgentExecutor::new(spec, self)
    }

    async fn run_session(
        &self,
        board: &Blackboard,
        session: &SessionId,
    ) -> Result<String, SupervisorError> {
        let request = board
            .read(REQUEST_KEY)
            .map(|value| response_text(&value))
            .unwrap_or_default();
        let catalog = self.registry.cards();
        let mut best = String::new();

        tracing::debug!(session = %session, request = %request, "ensemble.supervisor.start");

        for cycle in 1..=self.max_invocations {
            self.sessions.append(
                session,
                ChatMessage::user(plan_prompt(&request, &catalog, &best)),
            );
            let history = self.sessions.messages(session);
            let decision = self
                .planner
                .plan(&history)
                .await
                .map_err(SupervisorError::Planner)?;
            self.sessions
                .append(session, ChatMessage::assistant(decision_text(&decision)));
            tracing::debug!(cycle, agent = %decision.agent, "ensemble.supervisor.plan");

            if decision.is_done() {
                if let Some(candidate) = decision.candidate() {
                    let candidate = response_text(candidate);
                    let scores = self
                        .scorer
                        .score(&request, &best, &candidate)
                        .await
                        .map_err(SupervisorError::Scorer)?;
                    tracing::debug!(
                        incumbent = scores.incumbent,
                        candidate = scores.candidate,
                        "ensemble.supervisor.score"
                    );
                    if scores.prefers_candidate() {
                        best = candidate;
                    }
                }
                return Ok(best);
            }

            let executor = self
                .registry
                .get(&decision.agent)
                .ok_or_else(|| InvokeError::UnknownAgent(AgentName::new(decision.agent.clone())))?;

            board.write_all(decision.arguments.clone());

            // A private window for this one call. Agents that keep
            // conversational state adopt it instead of their own log.
            let scratch = Arc::new(WindowMemory::with_max_messages(self.memory_window));
            let adopted = executor.inject_memory(scratch.clone());

            let response = executor.invoke(board).await?;
            tracing::debug!(cycle, agent = %executor.name(), "ensemble.supervisor.invoke");
            best = response_text(&response);

            if adopted {
                // Fold the call's own dialogue into the planning session:
                // what was asked of the agent and how it finally answered.
                let log = scratch.messages();
                if let Some(first_user) = log.iter().find(|m| m.role == MessageRole::User) {
                    self.sessions.append(session, first_user.clone());
                }
                if let Some(last_assistant) =
                    log.iter().rev().find(|m| m.role == MessageRole::Assistant)
                {
                    self.sessions.append(session, last_assistant.clone());
                }
                scratch.clear();
            } else {
                // No dialogue to fold in; synthesize the exchange instead.
                let arguments = Value::Object(decision.arguments.clone());
                self.sessions.append(
                    session,
                    ChatMessage::user(format!(
                        "{} using {arguments}",
                        executor.spec().description()
                    )),
                );
                let state = Value::Object(board.state());
                self.sessions.append(
                    session,
                    ChatMessage::assistant(format!("{best} with state {state}")),
                );
            }
        }

        tracing::debug!(
            max_invocations = self.max_invocations,
            "ensemble.supervisor.exhausted"
        );
        Ok(best)
    }
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("agents", &self.registry.len())
            .field("max_invocations", &self.max_invocations)
            .field("memory_window", &self.memory_window)
            .field("output_key", &self.output_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Agent for Supervisor {
    async fn call(&self, arguments: Vec<Value>) -> Result<Value, BoxError> {
        let board = self.binding.bound_or_new();
        if let Some(request) = arguments.into_iter().next() {
            board.write(REQUEST_KEY, request);
        }
        let text = self.execute(&board).await?;
        Ok(Value::String(text))
    }

    fn bind_board(&self, board: &Blackboard) -> bool {
        self.binding.bind(board.clone());
        true
    }
}

/// Builder for [`Supervisor`].
pub struct SupervisorBuilder {
    registry: AgentRegistry,
    planner: Arc<dyn Planner>,
    scorer: Arc<dyn Scorer>,
    max_invocations: usize,
    memory_window: usize,
    output_key: Option<String>,
    sessions: Option<Arc<SessionMemory>>,
}

impl SupervisorBuilder {
    /// Adds one agent the planner may pick.
    #[must_use]
    pub fn register(mut self, executor: AgentExecutor) -> Self {
        self.registry.register(executor);
        self
    }

    /// Replaces the whole registry.
    #[must_use]
    pub fn registry(mut self, registry: AgentRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Ceiling on planning cycles per run. Hitting it ends the run with
    /// the last response.
    #[must_use]
    pub fn max_invocations(mut self, max_invocations: usize) -> Self {
        self.max_invocations = max_invocations;
        self
    }

    /// Window size for the planning session and for the per-call logs
    /// offered to agents.
    #[must_use]
    pub fn memory_window(mut self, memory_window: usize) -> Self {
        self.memory_window = memory_window;
        self
    }

    /// Board key the final response is written under.
    #[must_use]
    pub fn output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// Uses a caller-owned session store instead of a private one.
    #[must_use]
    pub fn session_store(mut self, sessions: Arc<SessionMemory>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Finalizes the supervisor.
    pub fn build(self) -> Supervisor {
        let sessions = self
            .sessions
            .unwrap_or_else(|| Arc::new(SessionMemory::with_max_messages(self.memory_window)));
        Supervisor {
            registry: self.registry,
            planner: self.planner,
            scorer: self.scorer,
            max_invocations: self.max_invocations,
            memory_window: self.memory_window,
            output_key: self.output_key,
            sessions,
            binding: BoardBinding::new(),
        }
    }
}

fn plan_prompt(request: &str, catalog: &str, last: &str) -> String {
    let last = if last.is_empty() { "(none)" } else { last };
    format!("User request: {request}\n\nAvailable agents:\n{catalog}\n\nLast response: {last}")
}

fn decision_text(decision: &PlanDecision) -> String {
    let mut object = Map::new();
    object.insert("agent".into(), Value::String(decision.agent.clone()));
    object.insert(
        "arguments".into(),
        Value::Object(decision.arguments.clone()),
    );
    Value::Object(object).to_string()
}
