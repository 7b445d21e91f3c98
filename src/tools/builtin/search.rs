//! Search results handler.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RunContext;
use crate::search::ResultSearch;
use crate::tools::handler::{require_str, HandlerError, ToolHandler};

/// Answers `fetchExternalResult` by querying the search collaborator.
///
/// Collaborator failures are reported as handler errors; the registry turns
/// them into structured error payloads so the engine can keep reasoning.
pub struct FetchResultsHandler {
    search: Arc<dyn ResultSearch>,
}

impl FetchResultsHandler {
    pub fn new(search: Arc<dyn ResultSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl ToolHandler for FetchResultsHandler {
    fn name(&self) -> &str {
        "fetchExternalResult"
    }

    async fn handle(
        &self,
        args: serde_json::Value,
        _ctx: &RunContext,
    ) -> Result<serde_json::Value, HandlerError> {
        let query = require_str(&args, "query")?;

        let results = self
            .search
            .search(query)
            .await
            .map_err(|e| HandlerError::Collaborator(e.to_string()))?;

        Ok(serde_json::json!({
            "query": query,
            "organic_results": results.organic,
            "related_questions": results.related_questions,
            "related_searches": results.related_searches,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CapturedPayloads;
    use crate::error::SearchError;
    use crate::search::{SearchEntry, SearchResults};
    use uuid::Uuid;

    struct StubSearch {
        fail: bool,
    }

    #[async_trait]
    impl ResultSearch for StubSearch {
        async fn search(&self, query: &str) -> Result<SearchResults, SearchError> {
            if self.fail {
                return Err(SearchError::BadStatus(503));
            }
            Ok(SearchResults {
                organic: vec![SearchEntry {
                    position: 1,
                    title: format!("About {query}"),
                    url: "https://example.com".into(),
                    snippet: "A snippet.".into(),
                }],
                related_questions: vec!["Why?".into()],
                related_searches: vec![],
            })
        }
    }

    fn ctx() -> RunContext {
        RunContext::new(Uuid::new_v4(), "running shoes", CapturedPayloads::new())
    }

    #[tokio::test]
    async fn returns_structured_result_set() {
        let handler = FetchResultsHandler::new(Arc::new(StubSearch { fail: false }));
        let payload = handler
            .handle(serde_json::json!({"query": "running shoes"}), &ctx())
            .await
            .unwrap();

        assert_eq!(payload["query"], "running shoes");
        assert_eq!(payload["organic_results"][0]["title"], "About running shoes");
        assert_eq!(payload["related_questions"][0], "Why?");
    }

    #[tokio::test]
    async fn collaborator_failure_is_a_handler_error() {
        let handler = FetchResultsHandler::new(Arc::new(StubSearch { fail: true }));
        let err = handler
            .handle(serde_json::json!({"query": "running shoes"}), &ctx())
            .await
            .unwrap_err();

        assert!(matches!(err, HandlerError::Collaborator(_)));
    }

    #[tokio::test]
    async fn missing_query_is_rejected() {
        let handler = FetchResultsHandler::new(Arc::new(StubSearch { fail: false }));
        let err = handler.handle(serde_json::json!({}), &ctx()).await.unwrap_err();
        assert!(matches!(err, HandlerError::MissingParam(_)));
    }
}
