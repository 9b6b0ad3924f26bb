//! Planning: decide which agent runs next, or stop.
//!
//! A [`Planner`] turns the planning dialogue so far into one
//! [`PlanDecision`]. The stock [`LlmPlanner`] instructs a completion model
//! to answer with a single JSON object and decodes it, tolerating a fenced
//! code block around the object but nothing looser.

use crate::completion::{CompletionError, CompletionModel};
use async_trait::async_trait;
use ensemble_core::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel agent name that ends a supervisor run.
pub const DONE: &str = "done";

/// Argument key a `done` decision carries its final candidate under.
pub const CANDIDATE_KEY: &str = "response";

const PLANNER_PROMPT: &str = "\
You are a supervisor that plans one step at a time.
Given the user request, the available agents, and the last response, pick \
the single agent to invoke next and the arguments to pass it.
Respond with one JSON object and nothing else:
{\"agent\": \"<agent name>\", \"arguments\": {\"<param>\": \"<value>\"}}
When the request is fully answered, respond with:
{\"agent\": \"done\", \"arguments\": {\"response\": \"<the final answer>\"}}";

/// One planning verdict: the agent to invoke next and its named arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDecision {
    /// Target agent name, or the [`DONE`] sentinel.
    pub agent: String,
    /// Named arguments to write into the shared board before the call.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl PlanDecision {
    /// Decision to invoke `agent` next.
    pub fn invoke(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            arguments: Map::new(),
        }
    }

    /// Decision to stop, with no final candidate.
    pub fn done() -> Self {
        Self::invoke(DONE)
    }

    /// Decision to stop, proposing `candidate` as the final response.
    pub fn done_with(candidate: impl Into<Value>) -> Self {
        Self::done().with_argument(CANDIDATE_KEY, candidate)
    }

    /// Adds one named argument.
    #[must_use]
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Whether this decision ends the run. The sentinel is matched
    /// case-insensitively, so `Done` and `DONE` terminate too.
    pub fn is_done(&self) -> bool {
        self.agent.eq_ignore_ascii_case(DONE)
    }

    /// Final candidate carried by a `done` decision, if any.
    pub fn candidate(&self) -> Option<&Value> {
        self.arguments.get(CANDIDATE_KEY)
    }
}

/// Chooses the next step of a supervisor run.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Produce the next decision from the planning dialogue so far.
    async fn plan(&self, history: &[ChatMessage]) -> Result<PlanDecision, CompletionError>;
}

/// Planner backed by a completion model held to a JSON-only protocol.
#[derive(Debug)]
pub struct LlmPlanner<M> {
    model: M,
    system_prompt: String,
}

impl<M: CompletionModel> LlmPlanner<M> {
    /// Planner with the stock protocol instructions.
    pub fn new(model: M) -> Self {
        Self::with_system_prompt(model, PLANNER_PROMPT)
    }

    /// Planner with caller-supplied protocol instructions. The prompt must
    /// still elicit the `{"agent": ..., "arguments": ...}` object or every
    /// plan will fail to decode.
    pub fn with_system_prompt(model: M, prompt: impl Into<String>) -> Self {
        Self {
            model,
            system_prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl<M: CompletionModel> Planner for LlmPlanner<M> {
    async fn plan(&self, history: &[ChatMessage]) -> Result<PlanDecision, CompletionError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend_from_slice(history);
        let raw = self.model.complete(&messages).await?;
        decode_decision(&raw)
    }
}

/// Decodes one decision from raw model text.
///
/// Tries the whole text as JSON first, then the body of a fenced code
/// block. Anything else is a hard [`CompletionError::Malformed`]; the loop
/// does not guess at free-form plans.
pub fn decode_decision(raw: &str) -> Result<PlanDecision, CompletionError> {
    if let Ok(decision) = serde_json::from_str::<PlanDecision>(raw.trim()) {
        return Ok(decision);
    }
    if let Some(body) = extract_json_fence(raw) {
        if let Ok(decision) = serde_json::from_str::<PlanDecision>(body) {
            return Ok(decision);
        }
    }
    Err(CompletionError::Malformed(format!(
        "planner returned invalid decision: {raw}"
    )))
}

/// Body of the outermost fenced code block, when it looks like JSON.
pub(crate) fn extract_json_fence(raw: &str) -> Option<&str> {
    let start = raw.find("```")?;
    let after_fence = &raw[start + 3..];
    // Skip the language tag line, e.g. the "json" in ```json.
    let body = &after_fence[after_fence.find('\n')? + 1..];
    let end = body.rfind("```")?;
    let candidate = body[..end].trim();
    (candidate.starts_with('{') || candidate.starts_with('[')).then_some(candidate)
}
