//! Abstract chat-completion backend.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a completion backend.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure: unreachable endpoint, timeout, TLS, etc.
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not match the expected schema.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend is not usable (e.g. no API key configured).
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// A chat-completion service reduced to the one call the bridge needs.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Human-readable backend name, for logging.
    fn name(&self) -> &str;

    /// Run one prompt to completion and return the raw response text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
