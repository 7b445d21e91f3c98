//! Payload capture handler.

use async_trait::async_trait;

use crate::context::RunContext;
use crate::tools::handler::{require_str, HandlerError, ToolHandler};

/// Answers `persistResult` by recording the content in the run's captured
/// payload store. Does not complete the job; the run controller resolves the
/// capture against the engine's final reply once the run ends.
pub struct PersistResultHandler;

#[async_trait]
impl ToolHandler for PersistResultHandler {
    fn name(&self) -> &str {
        "persistResult"
    }

    async fn handle(
        &self,
        args: serde_json::Value,
        ctx: &RunContext,
    ) -> Result<serde_json::Value, HandlerError> {
        let content = require_str(&args, "content")?;
        let keyword = args
            .get("keyword")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(&ctx.keyword);

        ctx.captured.insert(keyword, content).await;

        Ok(serde_json::json!({
            "saved": true,
            "keyword": keyword,
            "length": content.len(),
        }))
    }
}
