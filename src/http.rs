//! REST endpoints over the service facade.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::warn;
use uuid::Uuid;

use crate::service::BriefService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BriefService>,
}

/// Build the Axum router with the brief REST routes.
pub fn brief_routes(service: Arc<BriefService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/health", get(health))
        .route("/api/briefs", post(submit_brief))
        .route("/api/briefs/latest", get(latest_brief))
        .route("/api/briefs/process", post(process_one))
        .route("/api/briefs/{id}", get(get_brief))
        .route("/api/status", get(status_summary))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "briefsmith"
    }))
}

// ── Briefs ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    keyword: String,
}

async fn submit_brief(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> impl IntoResponse {
    match state.service.submit(&request.keyword).await {
        Ok(id) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "id": id })),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

async fn get_brief(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.service.get(id).await {
        Some(job) => (StatusCode::OK, Json(serde_json::json!(job))),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "no such job" })),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct LatestParams {
    keyword: String,
}

async fn latest_brief(
    State(state): State<AppState>,
    Query(params): Query<LatestParams>,
) -> impl IntoResponse {
    match state.service.get_by_keyword(&params.keyword).await {
        Some(job) => (StatusCode::OK, Json(serde_json::json!(job))),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "no job for keyword" })),
        ),
    }
}

/// On-demand trigger: claim one pending job and run it now. Shares the claim
/// path with the scheduler, so the two cannot race onto the same job.
async fn process_one(State(state): State<AppState>) -> Response {
    match state.service.claim_and_run().await {
        Ok(Some(id)) => (StatusCode::OK, Json(serde_json::json!({ "id": id }))).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            warn!(error = %e, "On-demand processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

// ── Status ──────────────────────────────────────────────────────────

async fn status_summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.status_summary().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrchestratorConfig;
    use crate::engine::{ConversationEngine, EngineMessage, MessageRole, RunState, ToolOutput};
    use crate::error::EngineError;
    use crate::jobs::JobStore;
    use crate::runner::RunController;
    use crate::tools::HandlerRegistry;

    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    /// Engine that completes every run on the first poll.
    struct ImmediateEngine;

    #[async_trait]
    impl ConversationEngine for ImmediateEngine {
        async fn create_conversation(&self) -> Result<String, EngineError> {
            Ok("conv".into())
        }
        async fn post_task(&self, _c: &str, _t: &str) -> Result<(), EngineError> {
            Ok(())
        }
        async fn start_run(&self, _c: &str) -> Result<String, EngineError> {
            Ok("run".into())
        }
        async fn run_state(&self, _c: &str, _r: &str) -> Result<RunState, EngineError> {
            Ok(RunState::Completed)
        }
        async fn submit_outputs(
            &self,
            _c: &str,
            _r: &str,
            _o: Vec<ToolOutput>,
        ) -> Result<(), EngineError> {
            Ok(())
        }
        async fn list_messages(&self, _c: &str) -> Result<Vec<EngineMessage>, EngineError> {
            Ok(vec![EngineMessage {
                role: MessageRole::Assistant,
                segments: vec!["Brief: one\ntwo\nthree".into()],
            }])
        }
    }

    fn test_router() -> (Router, Arc<JobStore>) {
        let store = JobStore::new();
        let controller = Arc::new(RunController::new(
            Arc::new(ImmediateEngine),
            Arc::clone(&store),
            Arc::new(HandlerRegistry::new()),
            OrchestratorConfig {
                poll_interval: Duration::from_millis(1),
                ..OrchestratorConfig::default()
            },
        ));
        let service = Arc::new(BriefService::new(Arc::clone(&store), controller));
        (brief_routes(service), store)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn submit_then_fetch() {
        let (app, _store) = test_router();

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/briefs")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"keyword": "running shoes"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::get(format!("/api/briefs/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let job = body_json(response).await;
        assert_eq!(job["keyword"], "running shoes");
        assert_eq!(job["status"], "pending");
    }

    #[tokio::test]
    async fn empty_keyword_is_rejected() {
        let (app, _store) = test_router();

        let response = app
            .oneshot(
                Request::post("/api/briefs")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"keyword": ""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (app, _store) = test_router();

        let response = app
            .oneshot(
                Request::get(format!("/api/briefs/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn process_drains_one_job() {
        let (app, store) = test_router();
        store.insert("running shoes").await.unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/briefs/process")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Nothing left to claim.
        let response = app
            .oneshot(
                Request::post("/api/briefs/process")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn status_counts_partitions() {
        let (app, store) = test_router();
        store.insert("a").await.unwrap();
        store.insert("b").await.unwrap();

        let response = app
            .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let summary = body_json(response).await;
        assert_eq!(summary["pending_count"], 2);
        assert_eq!(summary["completed_count"], 0);
    }

    #[tokio::test]
    async fn latest_by_keyword() {
        let (app, store) = test_router();
        store.insert("kw").await.unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/briefs/latest?keyword=kw")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get("/api/briefs/latest?keyword=missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
