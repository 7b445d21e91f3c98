//! Handler abstraction for tool invocations.

use async_trait::async_trait;

use crate::context::RunContext;

/// Handler-level errors. The registry converts these into structured error
/// payloads; they never cross the dispatch boundary as errors.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("missing parameter: {0}")]
    MissingParam(String),

    #[error("collaborator call failed: {0}")]
    Collaborator(String),
}

/// A handler for one named invocation.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The invocation name this handler answers.
    fn name(&self) -> &str;

    /// Produce the output payload for one invocation.
    async fn handle(
        &self,
        args: serde_json::Value,
        ctx: &RunContext,
    ) -> Result<serde_json::Value, HandlerError>;
}

/// Extract a required string parameter.
pub fn require_str<'a>(args: &'a serde_json::Value, key: &str) -> Result<&'a str, HandlerError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerError::MissingParam(key.to_string()))
}
