use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::api;
use crate::state::AppState;
use std::sync::Arc;

/// Create the HTTP router
///
/// - `GET /` - plain-text liveness greeting
/// - `GET /status` - model initialization state as JSON
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .route("/status", get(api::model_status))
        .layer(TraceLayer::new_for_http())
}
