//! WebSocket message types
//!
//! Every text frame is a named-event envelope:
//!
//! ```json
//! {"event": "user-transcript", "data": "what is the range of the RV400?"}
//! {"event": "ai-reply", "data": {"text": "The RV400 ..."}}
//! ```

use serde::{Deserialize, Serialize};

/// Maximum allowed size for one transcript (50 KB)
pub const MAX_TRANSCRIPT_SIZE: usize = 50 * 1024;

// =============================================================================
// Incoming Messages (Client -> Server)
// =============================================================================

/// Incoming WebSocket messages from client
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum IncomingMessage {
    /// Final speech-recognition text to answer
    #[serde(rename = "user-transcript")]
    UserTranscript(String),

    /// Raw audio from the browser. Accepted for compatibility and ignored.
    #[serde(rename = "audio-chunk")]
    AudioChunk(serde_json::Value),
}

impl IncomingMessage {
    /// Reject payloads over the size limits.
    ///
    /// Whitespace-only transcripts pass regardless of length; they are
    /// dropped later without a reply.
    pub fn validate_size(&self) -> Result<(), String> {
        match self {
            Self::UserTranscript(text)
                if text.len() > MAX_TRANSCRIPT_SIZE && !text.trim().is_empty() =>
            {
                Err(format!(
                    "That message is too long ({} bytes). Please keep it under {} KB.",
                    text.len(),
                    MAX_TRANSCRIPT_SIZE / 1024
                ))
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Outgoing Messages (Server -> Client)
// =============================================================================

/// Outgoing WebSocket messages to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum OutgoingMessage {
    /// Sent once after the upgrade completes
    #[serde(rename = "connected")]
    Connected {
        /// Session identifier
        id: String,
    },

    /// Generated reply, or fallback text when generation failed
    #[serde(rename = "ai-reply")]
    AiReply { text: String },
}

impl OutgoingMessage {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::AiReply { text: text.into() }
    }
}

/// Routes for the socket writer task
#[derive(Debug)]
pub enum MessageRoute {
    Outgoing(OutgoingMessage),
    Close,
}
