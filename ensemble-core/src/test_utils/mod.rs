//! In-memory implementations for testing.
//!
//! Available behind the `test-utils` feature flag. These are minimal
//! implementations that prove the trait APIs are usable.

mod fn_agent;
mod scripted_agent;
mod vec_memory;

pub use fn_agent::FnAgent;
pub use scripted_agent::ScriptedAgent;
pub use vec_memory::VecMemory;
