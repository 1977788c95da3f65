//! Google Gemini text generation.

mod messages;
mod provider;

pub use provider::{GEMINI_API_BASE_URL, GeminiProvider};
