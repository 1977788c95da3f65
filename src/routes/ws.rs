//! Voice WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::ws_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the voice WebSocket router
///
/// # Endpoint
///
/// `GET /ws` - WebSocket upgrade
///
/// # Example
///
/// ```json
/// // Server acknowledges the connection
/// {"event": "connected", "data": {"id": "4f6c..."}}
///
/// // Client sends a final transcript
/// {"event": "user-transcript", "data": "Which scooter has the longest range?"}
///
/// // Server answers on the same connection
/// {"event": "ai-reply", "data": {"text": "The RV400 ..."}}
/// ```
pub fn create_ws_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
}
