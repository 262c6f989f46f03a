//! Generation capability trait for composing grounded answers.

use async_trait::async_trait;

use crate::error::Result;

/// A generation model that completes a single prompt.
///
/// One prompt in, one text completion out: no streaming, no tool use, no
/// conversation state. Keeping the surface to a single method makes the
/// query engine testable against deterministic stand-ins without network
/// access.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A short name identifying the backend, used in error reports.
    fn name(&self) -> &str;

    /// Generate a text completion for the given prompt.
    ///
    /// A failed or timed-out model call surfaces as
    /// [`QaError::GenerationError`](crate::QaError::GenerationError);
    /// the engine never retries on the caller's behalf.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
