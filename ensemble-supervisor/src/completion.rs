//! The completion seam: one async function from a dialogue to text.
//!
//! Planners and scorers are generic over [`CompletionModel`] so the loop
//! logic can be tested against scripted text and shipped against any
//! provider client.

use async_trait::async_trait;
use ensemble_core::{BoxError, ChatMessage};
use thiserror::Error;

/// Failure modes of a completion backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompletionError {
    /// The backend never produced a completion.
    #[error("completion request failed: {0}")]
    RequestFailed(String),

    /// The backend answered, but not in the shape the caller requires.
    #[error("malformed completion: {0}")]
    Malformed(String),

    /// Any other backend failure.
    #[error(transparent)]
    Other(#[from] BoxError),
}

/// A text-completion backend.
///
/// Implementations receive the full dialogue so far and return the text of
/// one assistant message. The supervisor crate never constructs provider
/// requests itself; everything below this trait is someone else's client.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Complete the dialogue with one assistant message.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

#[async_trait]
impl<M: CompletionModel + ?Sized> CompletionModel for std::sync::Arc<M> {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        (**self).complete(messages).await
    }
}
