#![deny(missing_docs)]
//! Bounded conversation memory for ensemble.
//!
//! Two implementations of the windowed message-log contract: [`WindowMemory`]
//! keeps the most recent N messages of one conversation, [`SessionMemory`]
//! keys independent windows by session id so one store can serve many
//! concurrent executions. Both evict from the front — the oldest message
//! goes first, regardless of role.

mod session;
mod window;

pub use session::SessionMemory;
pub use window::WindowMemory;
