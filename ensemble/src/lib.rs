#![deny(missing_docs)]
//! # ensemble — umbrella crate
//!
//! Provides a single import surface for the ensemble workspace. Re-exports
//! the member crates behind feature flags, plus a `prelude` for the happy
//! path.

#[cfg(feature = "core")]
pub use ensemble_core;
#[cfg(feature = "guard")]
pub use ensemble_guard;
#[cfg(feature = "memory")]
pub use ensemble_memory;
#[cfg(feature = "supervisor")]
pub use ensemble_supervisor;
#[cfg(feature = "workflow")]
pub use ensemble_workflow;

/// Happy-path imports for composing agent pipelines.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use ensemble_core::{
        Agent, AgentExecutor, AgentName, AgentRegistry, AgentSpec, Blackboard, BoardBinding,
        BoxError, ChatMemory, ChatMessage, Conversation, Directive, InvokeError, ParamKind,
        ParamSpec, REQUEST_KEY, response_text,
    };

    #[cfg(feature = "memory")]
    pub use ensemble_memory::{SessionMemory, WindowMemory};

    #[cfg(feature = "guard")]
    pub use ensemble_guard::GuardedAgent;

    #[cfg(feature = "supervisor")]
    pub use ensemble_supervisor::{
        CompletionModel, LlmPlanner, LlmScorer, PlanDecision, Planner, ResponseScores, Scorer,
        Supervisor,
    };

    #[cfg(feature = "workflow")]
    pub use ensemble_workflow::{LoopAgent, SequenceAgent};
}
