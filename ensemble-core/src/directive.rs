//! Guard directives: the verdicts evaluation hooks return before and after
//! every guarded call, plus the request/response views those hooks see.

use crate::chat::Conversation;
use crate::id::AgentName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Verdict of one guard evaluation.
///
/// The request hook defaults to [`Directive::Prompt`] (call what was asked
/// for) and the response hook defaults to [`Directive::Terminate`] (accept
/// the answer). [`Directive::RedirectTo`] substitutes another agent for the
/// current turn: the guard calls the substitute itself, without handing
/// control back to the caller, and re-evaluates around the substituted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Directive {
    /// Proceed with the requested agent.
    Prompt,
    /// Call this agent instead, then evaluate its answer in turn.
    RedirectTo {
        /// Registered name of the substitute.
        target: AgentName,
    },
    /// Stop evaluating and return the response produced so far.
    Terminate,
}

impl Directive {
    /// Shorthand for [`Directive::RedirectTo`].
    pub fn redirect_to(target: impl Into<AgentName>) -> Self {
        Self::RedirectTo {
            target: target.into(),
        }
    }
}

/// What the request hook sees: which agent is about to be called, on which
/// conversation.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    agent: AgentName,
    conversation: Conversation,
}

impl AgentRequest {
    /// Build a request view.
    pub fn new(agent: impl Into<AgentName>, conversation: Conversation) -> Self {
        Self {
            agent: agent.into(),
            conversation,
        }
    }

    /// Agent about to be called.
    pub fn agent(&self) -> &AgentName {
        &self.agent
    }

    /// Conversation the call belongs to.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

/// What the response hook sees: which agent answered, what it said, on
/// which conversation.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    agent: AgentName,
    conversation: Conversation,
    response: Value,
}

impl AgentResponse {
    /// Build a response view.
    pub fn new(
        agent: impl Into<AgentName>,
        conversation: Conversation,
        response: Value,
    ) -> Self {
        Self {
            agent: agent.into(),
            conversation,
            response,
        }
    }

    /// Agent that answered.
    pub fn agent(&self) -> &AgentName {
        &self.agent
    }

    /// Conversation the call belongs to.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The answer under evaluation.
    pub fn response(&self) -> &Value {
        &self.response
    }
}
