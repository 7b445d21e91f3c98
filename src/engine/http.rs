//! Assistants-style HTTP engine client.
//!
//! Speaks the threads/runs wire protocol: create a thread, post a message,
//! start a run against a configured assistant, poll run status, submit tool
//! outputs, list messages. Every request carries the client-level timeout so
//! no poll or submit can block indefinitely.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::{ConversationEngine, EngineMessage, MessageRole, RunState, ToolInvocation, ToolOutput};
use crate::error::EngineError;

const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// HTTP client for an assistants-style engine.
pub struct AssistantsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    assistant_id: String,
}

impl AssistantsClient {
    /// Create a client. `base_url` is the API root without a trailing slash.
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        assistant_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::RequestFailed(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            assistant_id: assistant_id.into(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(self.api_key.expose_secret())
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, EngineError> {
        let response = builder
            .send()
            .await
            .map_err(|e| EngineError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::RequestFailed(format!(
                "status {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ConversationEngine for AssistantsClient {
    async fn create_conversation(&self) -> Result<String, EngineError> {
        let created: CreatedObject = self
            .send(self.request(reqwest::Method::POST, "/threads"))
            .await?;
        debug!(conversation_id = %created.id, "Created engine conversation");
        Ok(created.id)
    }

    async fn post_task(&self, conversation_id: &str, text: &str) -> Result<(), EngineError> {
        let path = format!("/threads/{conversation_id}/messages");
        let body = serde_json::json!({ "role": "user", "content": text });
        let _: CreatedObject = self
            .send(self.request(reqwest::Method::POST, &path).json(&body))
            .await?;
        Ok(())
    }

    async fn start_run(&self, conversation_id: &str) -> Result<String, EngineError> {
        let path = format!("/threads/{conversation_id}/runs");
        let body = serde_json::json!({ "assistant_id": self.assistant_id });
        let run: RunObject = self
            .send(self.request(reqwest::Method::POST, &path).json(&body))
            .await?;
        debug!(conversation_id, run_id = %run.id, "Started engine run");
        Ok(run.id)
    }

    async fn run_state(
        &self,
        conversation_id: &str,
        run_id: &str,
    ) -> Result<RunState, EngineError> {
        let path = format!("/threads/{conversation_id}/runs/{run_id}");
        let run: RunObject = self.send(self.request(reqwest::Method::GET, &path)).await?;
        run.into_state()
    }

    async fn submit_outputs(
        &self,
        conversation_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<(), EngineError> {
        let path = format!("/threads/{conversation_id}/runs/{run_id}/submit_tool_outputs");
        let body = serde_json::json!({
            "tool_outputs": outputs
                .iter()
                .map(|o| serde_json::json!({
                    "tool_call_id": o.invocation_id,
                    "output": o.output,
                }))
                .collect::<Vec<_>>(),
        });
        let _: RunObject = self
            .send(self.request(reqwest::Method::POST, &path).json(&body))
            .await?;
        Ok(())
    }

    async fn list_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<EngineMessage>, EngineError> {
        let path = format!("/threads/{conversation_id}/messages?order=asc");
        let list: MessageList = self.send(self.request(reqwest::Method::GET, &path)).await?;
        Ok(list.data.into_iter().map(MessageObject::into_message).collect())
    }
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: String,
    required_action: Option<RequiredAction>,
}

#[derive(Debug, Deserialize)]
struct RequiredAction {
    submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Debug, Deserialize)]
struct SubmitToolOutputs {
    tool_calls: Vec<ToolCallObject>,
}

#[derive(Debug, Deserialize)]
struct ToolCallObject {
    id: String,
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    /// JSON-encoded on the wire.
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    text: Option<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    value: String,
}

impl RunObject {
    fn into_state(self) -> Result<RunState, EngineError> {
        match self.status.as_str() {
            "queued" => Ok(RunState::Queued),
            "in_progress" => Ok(RunState::InProgress),
            "requires_action" => {
                let invocations = self
                    .required_action
                    .map(|a| a.submit_tool_outputs.tool_calls)
                    .unwrap_or_default()
                    .into_iter()
                    .map(ToolCallObject::into_invocation)
                    .collect();
                Ok(RunState::RequiresAction(invocations))
            }
            "completed" => Ok(RunState::Completed),
            "failed" => Ok(RunState::Failed),
            "cancelled" | "cancelling" => Ok(RunState::Cancelled),
            "expired" => Ok(RunState::Expired),
            other => Err(EngineError::UnknownStatus(other.to_string())),
        }
    }
}

impl ToolCallObject {
    fn into_invocation(self) -> ToolInvocation {
        // The engine JSON-encodes arguments; keep the raw string around if it
        // does not parse so the handler can still see what was asked.
        let arguments = serde_json::from_str(&self.function.arguments)
            .unwrap_or_else(|_| serde_json::json!({ "raw": self.function.arguments }));
        ToolInvocation {
            id: self.id,
            name: self.function.name,
            arguments,
        }
    }
}

impl MessageObject {
    fn into_message(self) -> EngineMessage {
        let role = match self.role.as_str() {
            "user" => MessageRole::User,
            "assistant" => MessageRole::Assistant,
            _ => MessageRole::Other,
        };
        let segments = self
            .content
            .into_iter()
            .filter(|p| p.kind == "text")
            .filter_map(|p| p.text.map(|t| t.value))
            .collect();
        EngineMessage { role, segments }
    }
}
