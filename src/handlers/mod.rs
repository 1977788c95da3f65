//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check and model status endpoints
//! - `ws` - Voice transcript WebSocket

pub mod api;
pub mod ws;

pub use ws::ws_handler;
