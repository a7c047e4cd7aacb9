//! REST API request handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{DemografiError, PlannerError, RetrievalError};
use crate::metrics::get_metrics;
use crate::service::Assistant;

/// Application state shared across handlers.
pub struct ApiState {
    pub assistant: Arc<Assistant>,
}

impl ApiState {
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self { assistant }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Question request, shared by `/ask` and `/retrieve`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub user_query: String,
    /// Number of rows to retrieve. Ignored by `/ask`.
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Direct plan evaluation request.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    pub plan: Value,
}

/// Retrieval response.
#[derive(Debug, Clone, Serialize)]
pub struct RetrieveResponse {
    pub results: Vec<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub records: usize,
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    code: &str,
) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /ask - Answer a natural-language question.
pub async fn ask_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<QueryRequest>,
) -> impl IntoResponse {
    match state.assistant.ask(&request.user_query).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(DemografiError::Planner(PlannerError::EmptyQuestion)) => error_response(
            StatusCode::BAD_REQUEST,
            "user_query must not be empty",
            "empty_query",
        ),
        Err(e @ DemografiError::Planner(PlannerError::InvalidPlan(_))) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), "invalid_plan")
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
            "planner_failed",
        ),
    }
}

/// POST /evaluate - Evaluate a plan supplied by the caller.
pub async fn evaluate_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<EvaluateRequest>,
) -> impl IntoResponse {
    let Value::Object(plan) = request.plan else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "plan must be a JSON object",
            "invalid_plan",
        );
    };

    match state.assistant.evaluate_offloaded(plan).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
            "evaluation_failed",
        ),
    }
}

/// POST /retrieve - Row descriptions nearest to a question.
pub async fn retrieve_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<QueryRequest>,
) -> impl IntoResponse {
    if request.user_query.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "user_query must not be empty",
            "empty_query",
        );
    }

    match state
        .assistant
        .retrieve(&request.user_query, request.top_k)
        .await
    {
        Ok(results) => (StatusCode::OK, Json(RetrieveResponse { results })).into_response(),
        Err(e @ DemografiError::Retrieval(RetrievalError::Disabled)) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string(), "retrieval_disabled")
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
            "retrieval_failed",
        ),
    }
}

/// GET /health - Liveness check.
pub async fn health_handler(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Backend is healthy.".to_string(),
        records: state.assistant.records(),
    })
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        get_metrics().export_prometheus(),
    )
}
