//! Integration tests for the HTTP API.
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`, with a
//! wiremock server standing in for the upstream generator where needed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sketch_core::{AiResponse, DiagramGenerator, GenerateError};
use sketch_server::{build_router, AppState, ServerConfig};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Generator with a canned answer.
struct Canned(Result<AiResponse, u16>);

#[async_trait]
impl DiagramGenerator for Canned {
    async fn generate(&self, _prompt: &str) -> Result<AiResponse, GenerateError> {
        self.0.clone().map_err(GenerateError::Status)
    }
}

fn chat_diagram() -> AiResponse {
    AiResponse::parse(
        r#"{
            "title": "Chat",
            "description": "Realtime chat",
            "elements": [
                {"type": "user", "label": "Client"},
                {"type": "server", "label": "Gateway"}
            ],
            "connections": [{"from": "Client", "to": "Gateway", "type": "bidirectional"}]
        }"#,
    )
    .expect("valid diagram")
}

fn app_with(generator: Canned) -> Router {
    build_router(AppState::new(Arc::new(generator)), 9474, None)
}

async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/generate-sketch")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

// ============================================================================
// Generate endpoint
// ============================================================================

#[tokio::test]
async fn test_generated_diagram_is_returned() {
    let (status, body) = post_json(app_with(Canned(Ok(chat_diagram()))), r#"{"prompt":"chat"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["fallback"], false);
    assert_eq!(body["data"]["title"], "Chat");
    assert_eq!(body["data"]["connections"][0]["type"], "bidirectional");
}

#[tokio::test]
async fn test_generator_failure_serves_fallback() {
    let (status, body) = post_json(app_with(Canned(Err(500))), r#"{"prompt":"chat"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["fallback"], true);
    assert_eq!(body["data"]["title"], "System Design");
    let labels: Vec<&str> = body["data"]["elements"]
        .as_array()
        .expect("elements")
        .iter()
        .filter_map(|e| e["label"].as_str())
        .collect();
    assert_eq!(labels, vec!["User", "Application Server", "Database"]);
}

#[tokio::test]
async fn test_invalid_prompts_are_rejected() {
    for body in [r"{}", r#"{"prompt":""}"#, r#"{"prompt":"   "}"#, r#"{"prompt":7}"#, "nope"] {
        let (status, json) = post_json(app_with(Canned(Ok(chat_diagram()))), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "INVALID_PROMPT");
    }
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_upstream_through_config() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/diagram"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "```json\n{\"title\":\"Queue\",\"elements\":[{\"type\":\"api\",\"label\":\"Producer\"}],\"connections\":[]}\n```",
        ))
        .expect(1)
        .mount(&upstream)
        .await;

    let config = ServerConfig {
        generator_url: Some(format!("{}/v1/diagram", upstream.uri())),
        request_timeout: Duration::from_secs(5),
        ..ServerConfig::new()
    };
    let state = AppState::from_config(&config).expect("state");
    let app = build_router(state, config.port, None);

    let (status, body) = post_json(app, r#"{"prompt":"a queue"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallback"], false);
    assert_eq!(body["data"]["title"], "Queue");
    assert_eq!(body["data"]["description"], "");
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_malformed_upstream_answer_falls_back() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"title":"","elements":[],"connections":[]}"#),
        )
        .mount(&upstream)
        .await;

    let config = ServerConfig {
        generator_url: Some(upstream.uri()),
        ..ServerConfig::new()
    };
    let app = build_router(AppState::from_config(&config).expect("state"), config.port, None);
    let (_, body) = post_json(app, r#"{"prompt":"x"}"#).await;
    assert_eq!(body["fallback"], true);
}

#[tokio::test]
async fn test_unconfigured_generator_always_falls_back() {
    let config = ServerConfig::new();
    let state = AppState::from_config(&config).expect("state");
    assert!(!state.generator_configured);
    let (_, body) = post_json(build_router(state, config.port, None), r#"{"prompt":"x"}"#).await;
    assert_eq!(body["fallback"], true);
}

// ============================================================================
// Health, request ids, static files
// ============================================================================

#[tokio::test]
async fn test_health_probes() {
    let app = app_with(Canned(Ok(chat_diagram())));
    assert_eq!(get(app.clone(), "/health/live").await.status(), StatusCode::OK);

    let response = get(app, "/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(json["checks"]["generator"], true);
    assert_eq!(json["checks"]["web_dir"], false);
    assert_eq!(json["status"], "degraded");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let response = get(app_with(Canned(Ok(chat_diagram()))), "/health/live").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_metrics_route_absent_without_recorder() {
    let response = get(app_with(Canned(Ok(chat_diagram()))), "/metrics").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_files_served_from_web_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("index.html"), "<html>sketch</html>").expect("write");

    let state = AppState {
        web_dir: Some(dir.path().to_path_buf()),
        ..AppState::new(Arc::new(Canned(Ok(chat_diagram()))))
    };
    let app = build_router(state, 9474, None);

    let response = get(app.clone(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    assert_eq!(&bytes[..], b"<html>sketch</html>");

    let ready = get(app, "/health/ready").await;
    let bytes = to_bytes(ready.into_body(), usize::MAX).await.expect("body");
    let json: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_cors_allows_localhost_only() {
    let app = app_with(Canned(Ok(chat_diagram())));
    let preflight = |origin: &'static str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/generate-sketch")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .expect("request")
    };

    let allowed = app
        .clone()
        .oneshot(preflight("http://localhost:5173"))
        .await
        .expect("response");
    assert_eq!(
        allowed
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );

    let denied = app
        .oneshot(preflight("https://evil.example"))
        .await
        .expect("response");
    assert!(!denied
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
