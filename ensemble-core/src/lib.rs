//! # ensemble-core — Execution protocol for composable agent systems
//!
//! This crate defines the shared-state and invocation machinery every
//! ensemble composition is built on.
//!
//! ## The Pieces
//!
//! | Piece | Types | What it does |
//! |-------|-------|-------------|
//! | Blackboard | [`Blackboard`], [`InvocationRecord`] | Shared state map + append-only invocation ledger |
//! | Descriptor | [`AgentSpec`], [`ParamSpec`] | What an agent is called, what it takes, where its answer lands |
//! | Agent | [`Agent`] | The callable contract: marshaled arguments in, one value out |
//! | Executor | [`AgentExecutor`], [`AgentRegistry`] | Drives one call: rebind, marshal, call, record |
//! | Conversation | [`Conversation`], [`ChatMemory`] | Message log + scratch state that outlive any one call |
//! | Directives | [`Directive`] | Verdicts guard hooks steer calls with |
//!
//! ## Design Principle
//!
//! Agents never see the board. An agent receives plain marshaled values and
//! returns one value; binding names to parameters, coercing text, writing
//! output keys, and recording the ledger all belong to the executor. This is
//! what keeps agents swappable: a closure, a model call, and a whole nested
//! composition implement the same two-line trait.
//!
//! ## Dependency Notes
//!
//! State entries, arguments, and responses are `serde_json::Value`. The
//! composing application decides what shape its state entries have, and JSON
//! is the interchange format the rest of the ecosystem already speaks.

#![deny(missing_docs)]

pub mod agent;
pub mod binding;
pub mod blackboard;
pub mod chat;
pub mod directive;
pub mod error;
pub mod executor;
pub mod id;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use agent::{AgentKind, AgentSpec};
pub use binding::{ParamKind, ParamSpec};
pub use blackboard::{Blackboard, InvocationRecord, REQUEST_KEY};
pub use chat::{response_text, ChatMemory, ChatMessage, Conversation, MessageRole};
pub use directive::{AgentRequest, AgentResponse, Directive};
pub use error::{BindError, BoxError, InvokeError};
pub use executor::{Agent, AgentExecutor, AgentRegistry, BoardBinding};
pub use id::{AgentName, BoardId, ConversationId, SessionId};
