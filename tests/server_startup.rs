//! Server Startup Tests
//!
//! Tests for the HTTP surface and startup behavior: the health greeting,
//! model status reporting through each initialization outcome, and
//! configuration-driven state construction.

mod common;

use std::sync::Arc;

use axum::{body::Body, http::Request, http::StatusCode};
use serde_json::Value;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voice_relay::{ServerConfig, routes, state::AppState};

use common::{FLASH, PRO, gemini_error, generate_path, mount_reply, test_config};

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn status_json(state: &Arc<AppState>) -> Value {
    let (status, body) = get(routes::create_router(Arc::clone(state)), "/status").await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

/// The root route answers with the plain greeting even without an API key
#[tokio::test]
async fn test_health_check_without_api_key() {
    let state = AppState::new(ServerConfig::default()).unwrap();
    let (status, body) = get(routes::create_router(state), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Voice Assistant Backend Running 🚀".as_bytes());
}

#[tokio::test]
async fn test_status_reports_initializing_before_probe() {
    let state = AppState::new(ServerConfig::default()).unwrap();
    let json = status_json(&state).await;

    assert_eq!(json["status"], "ok");
    assert_eq!(json["provider"], "gemini");
    assert_eq!(json["model"]["state"], "initializing");
    assert!(json["model"].get("model").is_none());
}

#[tokio::test]
async fn test_status_reports_committed_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path(FLASH)))
        .respond_with(ResponseTemplate::new(404).set_body_json(gemini_error(
            404,
            "NOT_FOUND",
            "model retired",
        )))
        .mount(&server)
        .await;
    mount_reply(&server, PRO, "Hi!").await;

    let state = AppState::new(test_config(&server.uri())).unwrap();
    state.spawn_model_initialization().await.unwrap();

    let json = status_json(&state).await;
    assert_eq!(json["model"]["state"], "ready");
    assert_eq!(json["model"]["model"], PRO);
}

#[tokio::test]
async fn test_status_reports_failure_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(gemini_error(
            401,
            "UNAUTHENTICATED",
            "API key not valid",
        )))
        .mount(&server)
        .await;

    let state = AppState::new(test_config(&server.uri())).unwrap();
    state.spawn_model_initialization().await.unwrap();

    let json = status_json(&state).await;
    assert_eq!(json["model"]["state"], "failed");
    let reason = json["model"]["error"].as_str().unwrap();
    assert!(reason.contains(FLASH), "got {reason}");
    assert!(reason.contains(PRO), "got {reason}");
}

#[tokio::test]
async fn test_ws_route_requires_upgrade() {
    let state = AppState::new(ServerConfig::default()).unwrap();
    let (status, _) = get(routes::create_router(state), "/ws").await;
    assert!(status.is_client_error(), "got {status}");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let state = AppState::new(ServerConfig::default()).unwrap();
    let (status, _) = get(routes::create_router(state), "/speak").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unsupported_provider_fails_state_construction() {
    let mut config = ServerConfig::default();
    config.llm_provider = "openai".to_string();
    assert!(AppState::new(config).is_err());
}
