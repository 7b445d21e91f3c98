//! Handler registry — name-keyed dispatch table.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::context::RunContext;
use crate::engine::{ToolInvocation, ToolOutput};
use crate::tools::handler::ToolHandler;

/// Registry of invocation handlers, resolved by name at dispatch time.
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a handler under its own name.
    pub async fn register(&self, handler: Arc<dyn ToolHandler>) {
        let name = handler.name().to_string();
        self.handlers.write().await.insert(name.clone(), handler);
        tracing::debug!("Registered handler: {}", name);
    }

    /// Get a handler by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.read().await.get(name).cloned()
    }

    /// Check if a handler exists.
    pub async fn has(&self, name: &str) -> bool {
        self.handlers.read().await.contains_key(name)
    }

    /// List all handler names.
    pub async fn list(&self) -> Vec<String> {
        self.handlers.read().await.keys().cloned().collect()
    }

    /// Answer one invocation. Always produces exactly one output: handler
    /// errors become structured error payloads and an unrecognized name gets
    /// a structured "unknown function" payload, because a run that is owed an
    /// output it never receives stalls indefinitely.
    pub async fn dispatch(&self, invocation: &ToolInvocation, ctx: &RunContext) -> ToolOutput {
        let payload = match self.get(&invocation.name).await {
            Some(handler) => match handler.handle(invocation.arguments.clone(), ctx).await {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        invocation = %invocation.name,
                        error = %e,
                        "Handler failed, returning structured error"
                    );
                    serde_json::json!({ "error": e.to_string() })
                }
            },
            None => {
                tracing::warn!(invocation = %invocation.name, "Unknown invocation name");
                serde_json::json!({ "error": "unknown function" })
            }
        };

        ToolOutput {
            invocation_id: invocation.id.clone(),
            output: payload.to_string(),
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
