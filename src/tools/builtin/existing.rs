//! Prior-work handler.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RunContext;
use crate::jobs::JobStore;
use crate::tools::handler::{HandlerError, ToolHandler};

/// Answers `retrieveExisting`: the current job's keyword context plus the
/// most recent completed brief for that keyword, if one exists. No external
/// call is made.
pub struct ExistingWorkHandler {
    store: Arc<JobStore>,
}

impl ExistingWorkHandler {
    pub fn new(store: Arc<JobStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolHandler for ExistingWorkHandler {
    fn name(&self) -> &str {
        "retrieveExisting"
    }

    async fn handle(
        &self,
        args: serde_json::Value,
        ctx: &RunContext,
    ) -> Result<serde_json::Value, HandlerError> {
        // The engine may name a keyword; default to the job's own.
        let keyword = args
            .get("keyword")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(&ctx.keyword)
            .to_string();

        let previous = self
            .store
            .list_completed()
            .await
            .into_iter()
            .rev()
            .find(|job| job.keyword == keyword && job.id != ctx.job_id);

        let payload = match previous {
            Some(job) => serde_json::json!({
                "keyword": keyword,
                "exists": true,
                "brief": job.result,
                "completed_at": job.completed_at,
            }),
            None => serde_json::json!({
                "keyword": keyword,
                "exists": false,
            }),
        };

        Ok(payload)
    }
}
