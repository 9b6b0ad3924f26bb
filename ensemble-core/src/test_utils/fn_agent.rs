//! FnAgent — wraps a plain closure as an agent.

use crate::error::BoxError;
use crate::executor::Agent;
use async_trait::async_trait;
use serde_json::Value;

/// An agent backed by a closure over the marshaled arguments.
/// Used for testing executors and compositions without a model.
pub struct FnAgent<F> {
    f: F,
}

impl<F> FnAgent<F>
where
    F: Fn(Vec<Value>) -> Result<Value, BoxError> + Send + Sync,
{
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Agent for FnAgent<F>
where
    F: Fn(Vec<Value>) -> Result<Value, BoxError> + Send + Sync,
{
    async fn call(&self, arguments: Vec<Value>) -> Result<Value, BoxError> {
        (self.f)(arguments)
    }
}
