use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("llm client is not configured: {0}")]
    NotConfigured(String),
    #[error("llm network failure: {0}")]
    Network(String),
    #[error("llm api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("llm response envelope was malformed: {0}")]
    MalformedResponse(String),
}

/// Capability boundary for the external text-generation service: one prompt
/// in, raw reply text out. Sampling options belong to the implementation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
