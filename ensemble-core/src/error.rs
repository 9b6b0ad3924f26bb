//! Error types for argument binding and agent invocation.

use crate::binding::ParamKind;
use crate::id::AgentName;
use thiserror::Error;

/// Boxed error raised by an arbitrary agent callable.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Argument marshaling errors. Fatal to the current execution — the binding
/// layer never retries.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BindError {
    /// A declared parameter has no matching state entry.
    #[error("missing argument `{0}`")]
    MissingArgument(String),

    /// The single-parameter fallback could not pick a unique state entry.
    #[error("cannot bind parameter `{param}`: expected exactly one state entry, found {entries}")]
    AmbiguousBinding {
        /// The parameter being bound.
        param: String,
        /// Number of state entries present.
        entries: usize,
    },

    /// A text value cannot be coerced to the declared parameter kind.
    #[error("unsupported type for parameter `{param}`: cannot coerce text into {kind}")]
    UnsupportedType {
        /// The parameter being bound.
        param: String,
        /// The declared kind the text failed to coerce into.
        kind: ParamKind,
    },
}

/// Agent invocation errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Argument marshaling failed.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// No agent is registered under the requested name.
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentName),

    /// The underlying callable failed. Wrapped, never swallowed.
    #[error("agent `{agent}` failed: {source}")]
    Agent {
        /// Name of the failing agent.
        agent: AgentName,
        /// The callable's own error.
        source: BoxError,
    },
}
