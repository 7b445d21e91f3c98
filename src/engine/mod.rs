//! Conversational engine contract.
//!
//! The core depends only on this trait: a run-status vocabulary, ordered tool
//! invocations, batched outputs keyed by correlation id, and message listing.
//! `http::AssistantsClient` implements it over the assistants-style HTTP
//! protocol; tests script it directly.

pub mod http;

pub use http::AssistantsClient;

use async_trait::async_trait;

use crate::error::EngineError;

/// A named mid-run data request from the engine.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Correlation id assigned by the engine. Echoed back with the output.
    pub id: String,
    /// Invocation name, resolved against the handler registry.
    pub name: String,
    /// Structured arguments.
    pub arguments: serde_json::Value,
}

/// The answer to one tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Correlation id of the invocation this answers.
    pub invocation_id: String,
    /// JSON-encoded output payload.
    pub output: String,
}

/// Run status as reported by the engine.
#[derive(Debug, Clone)]
pub enum RunState {
    Queued,
    InProgress,
    /// The engine is blocked on tool outputs; invocations are in emitted order.
    RequiresAction(Vec<ToolInvocation>),
    Completed,
    Failed,
    Cancelled,
    Expired,
}

impl RunState {
    /// Label for a dead-run status, used verbatim in failure reasons.
    pub fn terminal_failure_label(&self) -> Option<&'static str> {
        match self {
            Self::Failed => Some("failed"),
            Self::Cancelled => Some("cancelled"),
            Self::Expired => Some("expired"),
            _ => None,
        }
    }
}

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    Other,
}

/// One conversation message with its text segments in emitted order.
#[derive(Debug, Clone)]
pub struct EngineMessage {
    pub role: MessageRole,
    pub segments: Vec<String>,
}

impl EngineMessage {
    /// Concatenate the message's text segments in emitted order.
    pub fn text(&self) -> String {
        self.segments.join("\n")
    }
}

/// A tool-calling conversational engine driven over its run protocol.
#[async_trait]
pub trait ConversationEngine: Send + Sync {
    /// Create a conversation; returns its opaque id.
    async fn create_conversation(&self) -> Result<String, EngineError>;

    /// Post the task message seeding the run.
    async fn post_task(&self, conversation_id: &str, text: &str) -> Result<(), EngineError>;

    /// Start a run on the conversation; returns the opaque run id.
    async fn start_run(&self, conversation_id: &str) -> Result<String, EngineError>;

    /// Poll the run's current state.
    async fn run_state(&self, conversation_id: &str, run_id: &str)
        -> Result<RunState, EngineError>;

    /// Submit one batch of tool outputs for a blocked run.
    async fn submit_outputs(
        &self,
        conversation_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<(), EngineError>;

    /// List the conversation's messages, oldest first.
    async fn list_messages(&self, conversation_id: &str)
        -> Result<Vec<EngineMessage>, EngineError>;
}
