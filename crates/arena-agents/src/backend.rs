use async_trait::async_trait;

use crate::error::AgentError;

/// A text-in, text-out model endpoint. Mockable for testing.
///
/// Implementations return the raw response text and report transport
/// problems as errors; turning either into a decision is the caller's job.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn call(&self, prompt: &str) -> Result<String, AgentError>;
}
