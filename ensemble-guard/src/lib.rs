#![deny(missing_docs)]
//! Guarded directive protocol for ensemble.
//!
//! A [`GuardedAgent`] wraps one primary agent with two evaluation hooks. The
//! request hook runs before the addressed agent and can substitute another
//! agent or stop the call; the response hook runs after every call and can
//! accept the answer, substitute a follow-up agent, or start a fresh round.
//! Substitutions never consume an additional caller turn — the guard drives
//! them itself within one `ask`.
//!
//! Hooks see the conversation (message log + scratch map), which outlives
//! any single `ask`. Writing a routing decision into the scratch map from a
//! hook is how "classify once, then always redirect to the same expert"
//! flows are built.

use ensemble_core::{
    response_text, AgentExecutor, AgentName, AgentRegistry, AgentRequest, AgentResponse,
    Blackboard, ChatMessage, Conversation, ConversationId, Directive, InvokeError, REQUEST_KEY,
};
use ensemble_memory::WindowMemory;
use serde_json::Value;
use std::sync::Arc;

type RequestHook = dyn Fn(&AgentRequest) -> Directive + Send + Sync;
type ResponseHook = dyn Fn(&AgentResponse) -> Directive + Send + Sync;

/// One primary agent guarded by request/response evaluation hooks.
///
/// Without hooks every `ask` is single-shot: the request hook defaults to
/// [`Directive::Prompt`], the response hook to [`Directive::Terminate`].
pub struct GuardedAgent {
    primary: AgentName,
    registry: AgentRegistry,
    board: Blackboard,
    conversation: Conversation,
    on_request: Option<Box<RequestHook>>,
    on_response: Option<Box<ResponseHook>>,
}

impl GuardedAgent {
    /// Create a builder guarding the named primary agent.
    #[must_use]
    pub fn builder(primary: impl Into<AgentName>) -> GuardedAgentBuilder {
        GuardedAgentBuilder {
            primary: primary.into(),
            registry: AgentRegistry::new(),
            board: None,
            conversation: None,
            on_request: None,
            on_response: None,
        }
    }

    /// The shared board executors run against.
    pub fn board(&self) -> &Blackboard {
        &self.board
    }

    /// The conversation hooks evaluate over.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// One caller turn: seed the board and the conversation with `request`,
    /// then run evaluation rounds until a directive terminates.
    ///
    /// Each round evaluates the request hook against the primary agent; a
    /// pre-call redirect substitutes the target without re-evaluating. After
    /// every call the response hook decides: terminate with the answer,
    /// redirect to a follow-up agent, or start a new round from the request
    /// hook. Terminating before any call in this turn returns `Null`.
    pub async fn ask(&self, request: impl Into<String>) -> Result<Value, InvokeError> {
        let request = request.into();
        self.conversation.append(ChatMessage::user(request.clone()));
        self.board.write(REQUEST_KEY, request);

        let mut response = Value::Null;
        let mut invoked = false;
        'round: loop {
            let mut target = self.primary.clone();
            let directive =
                self.evaluate_request(&AgentRequest::new(target.clone(), self.conversation.clone()));
            tracing::debug!(agent = %target, directive = ?directive, "ensemble.guard.request");
            match directive {
                Directive::Terminate => break 'round,
                Directive::RedirectTo { target: substitute } => target = substitute,
                Directive::Prompt => {}
            }

            loop {
                let executor = self
                    .registry
                    .get(target.as_str())
                    .ok_or_else(|| InvokeError::UnknownAgent(target.clone()))?;
                response = executor.invoke(&self.board).await?;
                invoked = true;

                let directive = self.evaluate_response(&AgentResponse::new(
                    target.clone(),
                    self.conversation.clone(),
                    response.clone(),
                ));
                tracing::debug!(agent = %target, directive = ?directive, "ensemble.guard.response");
                match directive {
                    Directive::Terminate => break 'round,
                    Directive::RedirectTo { target: substitute } => target = substitute,
                    Directive::Prompt => continue 'round,
                }
            }
        }

        if invoked {
            self.conversation
                .append(ChatMessage::assistant(response_text(&response)));
        }
        Ok(response)
    }

    fn evaluate_request(&self, request: &AgentRequest) -> Directive {
        match &self.on_request {
            Some(hook) => hook(request),
            None => Directive::Prompt,
        }
    }

    fn evaluate_response(&self, response: &AgentResponse) -> Directive {
        match &self.on_response {
            Some(hook) => hook(response),
            None => Directive::Terminate,
        }
    }
}

/// Builder for a [`GuardedAgent`].
///
/// Created via [`GuardedAgent::builder`]. Only the primary agent name and a
/// registry containing it are required; board, conversation, and hooks have
/// defaults.
pub struct GuardedAgentBuilder {
    primary: AgentName,
    registry: AgentRegistry,
    board: Option<Blackboard>,
    conversation: Option<Conversation>,
    on_request: Option<Box<RequestHook>>,
    on_response: Option<Box<ResponseHook>>,
}

impl GuardedAgentBuilder {
    /// Register one executor; redirect targets must be registered too.
    #[must_use]
    pub fn register(mut self, executor: AgentExecutor) -> Self {
        self.registry.register(executor);
        self
    }

    /// Replace the registry wholesale.
    #[must_use]
    pub fn registry(mut self, registry: AgentRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Run against an existing board instead of a fresh one.
    #[must_use]
    pub fn board(mut self, board: Blackboard) -> Self {
        self.board = Some(board);
        self
    }

    /// Evaluate hooks over an existing conversation instead of a fresh one.
    #[must_use]
    pub fn conversation(mut self, conversation: Conversation) -> Self {
        self.conversation = Some(conversation);
        self
    }

    /// Set the pre-call hook (default: always [`Directive::Prompt`]).
    #[must_use]
    pub fn on_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AgentRequest) -> Directive + Send + Sync + 'static,
    {
        self.on_request = Some(Box::new(hook));
        self
    }

    /// Set the post-call hook (default: always [`Directive::Terminate`]).
    #[must_use]
    pub fn on_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AgentResponse) -> Directive + Send + Sync + 'static,
    {
        self.on_response = Some(Box::new(hook));
        self
    }

    /// Build the [`GuardedAgent`].
    #[must_use]
    pub fn build(self) -> GuardedAgent {
        GuardedAgent {
            primary: self.primary,
            registry: self.registry,
            board: self.board.unwrap_or_default(),
            conversation: self.conversation.unwrap_or_else(|| {
                Conversation::new(ConversationId::generate(), Arc::new(WindowMemory::new()))
            }),
            on_request: self.on_request,
            on_response: self.on_response,
        }
    }
}
