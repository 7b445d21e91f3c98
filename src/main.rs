use std::sync::Arc;
use std::sync::atomic::Ordering;

use briefsmith::config::OrchestratorConfig;
use briefsmith::engine::AssistantsClient;
use briefsmith::http::brief_routes;
use briefsmith::jobs::JobStore;
use briefsmith::runner::RunController;
use briefsmith::scheduler::spawn_scheduler;
use briefsmith::search::HttpSearchClient;
use briefsmith::service::BriefService;
use briefsmith::tools::builtin::default_registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Read required credentials from environment
    let engine_api_key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: OPENAI_API_KEY not set");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });

    let assistant_id = std::env::var("BRIEFSMITH_ASSISTANT_ID").unwrap_or_else(|_| {
        eprintln!("Error: BRIEFSMITH_ASSISTANT_ID not set");
        eprintln!("  export BRIEFSMITH_ASSISTANT_ID=asst_...");
        std::process::exit(1);
    });

    let search_api_key = std::env::var("SERP_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: SERP_API_KEY not set");
        eprintln!("  export SERP_API_KEY=...");
        std::process::exit(1);
    });

    let engine_base_url = std::env::var("BRIEFSMITH_ENGINE_URL")
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    let search_endpoint = std::env::var("BRIEFSMITH_SEARCH_URL")
        .unwrap_or_else(|_| "https://serpapi.com/search".to_string());
    let port: u16 = std::env::var("BRIEFSMITH_PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse()
        .unwrap_or(8000);

    let config = OrchestratorConfig::from_env()?;

    eprintln!("📝 Briefsmith v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Engine: {}", engine_base_url);
    eprintln!("   API: http://0.0.0.0:{}/api/briefs", port);
    eprintln!(
        "   Scheduler: every {}s, {} polls per run\n",
        config.tick_interval.as_secs(),
        config.max_poll_attempts
    );

    // ── Components ───────────────────────────────────────────────────────
    let store = JobStore::new();

    let engine = Arc::new(AssistantsClient::new(
        engine_base_url,
        secrecy::SecretString::from(engine_api_key),
        assistant_id,
        config.engine_timeout,
    )?);

    let search = Arc::new(HttpSearchClient::new(
        search_endpoint,
        secrecy::SecretString::from(search_api_key),
        config.search_timeout,
    )?);

    let registry = Arc::new(default_registry(search, Arc::clone(&store)).await);

    let controller = Arc::new(RunController::new(
        engine,
        Arc::clone(&store),
        registry,
        config.clone(),
    ));

    let service = Arc::new(BriefService::new(Arc::clone(&store), controller));

    // ── Background scheduler ─────────────────────────────────────────────
    let (scheduler_handle, scheduler_shutdown) =
        spawn_scheduler(Arc::clone(&service), config.tick_interval);

    // ── HTTP surface ─────────────────────────────────────────────────────
    let app = brief_routes(service);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Ctrl+C received, shutting down...");
        })
        .await?;

    // Cleanup
    scheduler_shutdown.store(true, Ordering::Relaxed);
    scheduler_handle.abort();

    Ok(())
}
