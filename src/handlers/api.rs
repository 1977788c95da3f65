use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use std::sync::Arc;

use crate::core::model::ModelStatus;
use crate::state::AppState;

/// Plain-text liveness greeting
pub const HEALTH_CHECK_BODY: &str = "Voice Assistant Backend Running 🚀";

/// Health check handler
pub async fn health_check() -> &'static str {
    HEALTH_CHECK_BODY
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub provider: &'static str,
    pub model: ModelStatus,
}

/// Report the model slot so operators can see whether generation is available
pub async fn model_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatusResponse {
        status: "ok",
        provider: state.provider.name(),
        model: state.model.status(),
    })
}
