//! Deterministic agent composition over a shared board.
//!
//! Two workflow agents cover the non-planned side of orchestration:
//!
//! - [`SequenceAgent`] runs its steps in declaration order.
//! - [`LoopAgent`] repeats its steps until an exit condition over the
//!   board holds, bounded by a pass ceiling.
//!
//! Both are workflow-variant agents: they receive the whole state map,
//! merge it into the board they run on, and adopt an outer board when
//! composed. `into_executor` turns either into a registrable step, so a
//! loop nests inside a sequence and a sequence inside a supervisor with no
//! special casing.

#![deny(missing_docs)]

pub mod loop_impl;
pub mod sequence;

pub use loop_impl::{DEFAULT_MAX_ITERATIONS, ExitCondition, LoopAgent};
pub use sequence::SequenceAgent;
