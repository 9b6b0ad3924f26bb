//! An LLM-planned supervisor loop over a registry of agents.
//!
//! A [`Supervisor`] answers one request by cycling: consult a [`Planner`]
//! for the next step, invoke the chosen agent over a shared board, fold
//! the outcome back into the planning dialogue, and repeat until the
//! planner says `done` or a cycle ceiling is hit. A final answer the
//! planner proposes on its own is not taken on faith; a [`Scorer`] grades
//! it against the best response produced so far and it only wins on a
//! strictly higher grade.
//!
//! | Piece | Type | Role |
//! |---|---|---|
//! | Completion seam | [`CompletionModel`] | Dialogue in, one assistant text out |
//! | Planning | [`Planner`], [`PlanDecision`], [`LlmPlanner`] | Which agent runs next, with which arguments |
//! | Arbitration | [`Scorer`], [`ResponseScores`], [`LlmScorer`] | Whether a proposed final answer beats the incumbent |
//! | Loop | [`Supervisor`] | Sessioned plan/invoke/score cycles over one board |
//!
//! The loop never talks to a provider directly. Both stock
//! implementations ([`LlmPlanner`], [`LlmScorer`]) are generic over
//! [`CompletionModel`] and hold the model to a JSON-only protocol,
//! tolerating a fenced code block around the object but nothing looser.

#![deny(missing_docs)]

pub mod completion;
pub mod planner;
pub mod scorer;
pub mod supervisor;

pub use completion::{CompletionError, CompletionModel};
pub use planner::{DONE, LlmPlanner, PlanDecision, Planner};
pub use scorer::{LlmScorer, ResponseScores, Scorer};
pub use supervisor::{DEFAULT_MAX_INVOCATIONS, Supervisor, SupervisorBuilder, SupervisorError};
