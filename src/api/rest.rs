//! REST API router.

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::handlers::{
    ask_handler, evaluate_handler, health_handler, metrics_handler, retrieve_handler, ApiState,
};
use crate::config::Config;
use crate::error::Result;
use crate::service::Assistant;

/// Create the REST API router.
///
/// Endpoints:
/// - POST /ask       - Answer a question
/// - POST /evaluate  - Evaluate a plan directly
/// - POST /retrieve  - Nearest row descriptions
/// - GET  /health    - Liveness check
/// - GET  /metrics   - Prometheus metrics
pub fn create_router(assistant: Arc<Assistant>, enable_cors: bool) -> Router {
    let state = Arc::new(ApiState::new(assistant));

    let router = Router::new()
        .route("/ask", post(ask_handler))
        .route("/evaluate", post(evaluate_handler))
        .route("/retrieve", post(retrieve_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_origin(Any);

        router.layer(cors)
    } else {
        router
    }
}

/// Build the service from configuration and serve it until Ctrl-C.
pub async fn run_server(config: &Config) -> Result<()> {
    let assistant = Arc::new(Assistant::from_config(config).await?);
    info!(
        records = assistant.records(),
        planner = assistant.planner_name(),
        retrieval = assistant.retrieval_enabled(),
        cache = assistant.cache().is_enabled(),
        "Service ready"
    );

    let router = create_router(assistant, config.server.enable_cors);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
