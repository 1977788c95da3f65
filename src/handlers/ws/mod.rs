//! Voice WebSocket handlers
//!
//! # Protocol
//!
//! Every text frame is `{"event": <name>, "data": <payload>}`.
//!
//! ## Client → Server
//!
//! - **user-transcript**: Final transcript text (string) to answer
//! - **audio-chunk**: Accepted and ignored
//! - **Binary frames**: Ignored
//!
//! ## Server → Client
//!
//! - **connected**: `{"id": <session id>}`, sent once after the upgrade
//! - **ai-reply**: `{"text": <reply>}`, one per non-blank transcript, in
//!   submission order. Carries a fallback message when generation fails.

mod handler;
pub mod messages;
pub mod session;

pub use handler::ws_handler;
pub use session::ConnectionSession;
