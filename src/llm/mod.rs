//! Text generation gateway
//!
//! [`Generator`] is what the query orchestrator consumes; [`GroqClient`] implements it over
//! Groq's OpenAI-compatible chat completions API, blocking or streamed.

pub mod groq;
pub mod streaming;

use async_trait::async_trait;

pub use groq::GroqClient;
pub use streaming::StreamingResponse;

use crate::errors::Result;

/// Produces text from a prompt
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate the full completion
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate incrementally; fragments concatenate to the full completion
    async fn stream(&self, prompt: &str) -> Result<StreamingResponse>;

    /// Whether calls can succeed at all (e.g. an API key is configured)
    fn is_available(&self) -> bool;
}
