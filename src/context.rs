//! Per-run context handed to tool handlers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

/// Side-channel store for content saved via a persist-style tool invocation.
///
/// Lives exactly as long as one run. The run controller consults it when the
/// engine's final reply looks like a bare confirmation instead of the brief
/// itself.
pub struct CapturedPayloads {
    payloads: RwLock<HashMap<String, String>>,
}

impl CapturedPayloads {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            payloads: RwLock::new(HashMap::new()),
        })
    }

    /// Record a payload for a keyword, replacing any earlier capture.
    pub async fn insert(&self, keyword: &str, content: &str) {
        self.payloads
            .write()
            .await
            .insert(keyword.to_string(), content.to_string());
    }

    /// Fetch the captured payload for a keyword, if any.
    pub async fn get(&self, keyword: &str) -> Option<String> {
        self.payloads.read().await.get(keyword).cloned()
    }

    /// Number of captured payloads.
    pub async fn len(&self) -> usize {
        self.payloads.read().await.len()
    }

    /// Check if nothing has been captured.
    pub async fn is_empty(&self) -> bool {
        self.payloads.read().await.is_empty()
    }
}

/// Context for one dispatch-and-respond cycle.
#[derive(Clone)]
pub struct RunContext {
    /// The job being executed.
    pub job_id: Uuid,
    /// The job's keyword.
    pub keyword: String,
    /// The run's captured-payload store.
    pub captured: Arc<CapturedPayloads>,
}

impl RunContext {
    pub fn new(job_id: Uuid, keyword: impl Into<String>, captured: Arc<CapturedPayloads>) -> Self {
        Self {
            job_id,
            keyword: keyword.into(),
            captured,
        }
    }
}
