//! HTTP API tests driving the router directly.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use demografi::api::create_router;
use demografi::embedding::EmbeddingProvider;
use demografi::error::Result;
use demografi::planner::PlanGenerator;
use demografi::retrieval::ContextRetriever;
use demografi::service::Assistant;

use crate::common::{snapshot, FailingPlanner, StubPlanner};

/// Embeds a text by which state names it mentions.
struct StateEmbedder;

#[async_trait]
impl EmbeddingProvider for StateEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                ["Johor", "Perak", "Pahang"]
                    .iter()
                    .map(|state| if t.contains(state) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        3
    }

    fn model(&self) -> &str {
        "states"
    }
}

fn router_with(planner: Arc<dyn PlanGenerator>) -> Router {
    let assistant = Assistant::new(Arc::new(snapshot()), planner);
    create_router(Arc::new(assistant), true)
}

async fn router_with_retrieval() -> Router {
    let snapshot = Arc::new(snapshot());
    let retriever = ContextRetriever::build(Arc::new(StateEmbedder), snapshot.row_texts(), 10)
        .await
        .unwrap();
    let assistant = Assistant::new(snapshot, StubPlanner::new(json!({})))
        .with_retriever(Arc::new(retriever));
    create_router(Arc::new(assistant), true)
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(router_with(StubPlanner::new(json!({}))), "/health").await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Backend is healthy.");
    assert_eq!(body["records"], 6);
}

#[tokio::test]
async fn test_ask_returns_plan_and_answer() {
    let planner = StubPlanner::new(json!({
        "negeri": "Johor", "umur_min": "18", "umur_max": "30", "jantina": "Any"
    }));
    let (status, body) = post_json(
        router_with(planner),
        "/ask",
        json!({"user_query": "Berapa ramai belia di Johor?"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"]["negeri"], "Johor");
    assert_eq!(body["answer"]["total"], 5);
    assert_eq!(body["diagnostics"], json!([]));

    let labels: Vec<&str> = body["answer"]["groups"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|g| g["label"].as_str())
        .collect();
    assert!(labels.contains(&"Jantina"));
    assert!(!labels.contains(&"Umur"));
    assert!(!labels.contains(&"Negeri"));
}

#[tokio::test]
async fn test_ask_reports_diagnostics() {
    let planner = StubPlanner::new(json!({"umur_max": "enam puluh"}));
    let (status, body) = post_json(
        router_with(planner),
        "/ask",
        json!({"user_query": "warga emas"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"]["total"], 26);
    assert_eq!(body["diagnostics"][0]["kind"], "invalid_age_bound");
    assert_eq!(body["diagnostics"][0]["key"], "umur_max");
}

#[tokio::test]
async fn test_ask_blank_query() {
    let (status, body) = post_json(
        router_with(StubPlanner::new(json!({}))),
        "/ask",
        json!({"user_query": "  "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "empty_query");
}

#[tokio::test]
async fn test_ask_planner_failure() {
    let (status, body) = post_json(
        router_with(Arc::new(FailingPlanner)),
        "/ask",
        json!({"user_query": "Berapa ramai di Perak?"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "planner_failed");
}

#[tokio::test]
async fn test_ask_invalid_plan() {
    let (status, body) = post_json(
        router_with(StubPlanner::new(json!("Johor"))),
        "/ask",
        json!({"user_query": "Johor"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "invalid_plan");
}

#[tokio::test]
async fn test_evaluate_plan() {
    let router = router_with(StubPlanner::new(json!({})));
    let (status, body) = post_json(router, "/evaluate", json!({"plan": {"negeri": "Mars"}})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], json!({"total": 0, "groups": []}));
}

#[tokio::test]
async fn test_evaluate_rejects_non_object_plan() {
    let router = router_with(StubPlanner::new(json!({})));
    let (status, body) = post_json(router, "/evaluate", json!({"plan": ["negeri", "Johor"]})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_plan");
}

#[tokio::test]
async fn test_retrieve_disabled() {
    let (status, body) = post_json(
        router_with(StubPlanner::new(json!({}))),
        "/retrieve",
        json!({"user_query": "Perak"}),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "retrieval_disabled");
}

#[tokio::test]
async fn test_retrieve_nearest_rows() {
    let (status, body) = post_json(
        router_with_retrieval().await,
        "/retrieve",
        json!({"user_query": "penduduk Perak", "top_k": 2}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    for text in results {
        assert!(text.as_str().unwrap().contains("Negeri: Perak"));
    }
}

#[tokio::test]
async fn test_metrics_exposition() {
    let router = router_with(StubPlanner::new(json!({})));
    post_json(router.clone(), "/evaluate", json!({"plan": {}})).await;

    let (status, body) = get(router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("demografi_evaluations_total"));
    assert!(text.contains("demografi_records_loaded"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let router = router_with(StubPlanner::new(json!({})));
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/ask")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
