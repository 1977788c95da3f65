//! Shared helpers for integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voice_relay::core::model::ModelHandle;
use voice_relay::{ServerConfig, routes, state::AppState};

pub const FLASH: &str = "gemini-1.5-flash";
pub const PRO: &str = "gemini-1.5-pro";

/// Upper bound for any single expected event
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Path of the generateContent call for `model`
pub fn generate_path(model: &str) -> String {
    format!("/v1beta/models/{model}:generateContent")
}

/// A successful generateContent body carrying `text`
pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

/// A Gemini error envelope
pub fn gemini_error(code: u16, status: &str, message: &str) -> Value {
    json!({"error": {"code": code, "message": message, "status": status}})
}

/// Mount a mock answering every call for `model` with `text`
pub async fn mount_reply(server: &MockServer, model: &str, text: &str) {
    Mock::given(method("POST"))
        .and(path(generate_path(model)))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(text)))
        .mount(server)
        .await;
}

/// Configuration pointed at `base_url` with a short cooldown
pub fn test_config(base_url: &str) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.gemini_api_key = Some("test-key".to_string());
    config.gemini_base_url = Some(base_url.to_string());
    config.model_candidates = vec![FLASH.to_string(), PRO.to_string()];
    config.queue_cooldown_ms = 50;
    config.generation_timeout_seconds = 5;
    config
}

/// Serve the full router on an ephemeral port
pub async fn start_server(state: Arc<AppState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Build state from `config`, run startup initialization to completion,
/// and serve it.
pub async fn start_initialized_server(config: ServerConfig) -> (Arc<AppState>, SocketAddr) {
    let state = AppState::new(config).unwrap();
    state.spawn_model_initialization().await.unwrap();
    let addr = start_server(Arc::clone(&state)).await;
    (state, addr)
}

/// Serve state whose slot already holds `model`, skipping the startup probe
/// so the mock only sees transcript traffic.
pub async fn start_ready_server(config: ServerConfig, model: &str) -> (Arc<AppState>, SocketAddr) {
    let handle = ModelHandle::new(model, config.model_config());
    let state = AppState::new(config).unwrap();
    assert!(state.model.commit(Arc::new(handle)));
    let addr = start_server(Arc::clone(&state)).await;
    (state, addr)
}
