//! Text-generation provider module.
//!
//! # Architecture
//!
//! Follows the same shape as the other provider families:
//! - `LlmProvider` trait for provider abstraction
//! - Factory function for creation by name
//!
//! # Example
//!
//! ```rust,ignore
//! use voice_relay::core::llm::{create_llm_provider, LlmConfig};
//! use voice_relay::core::model::{ModelConfig, ModelHandle};
//!
//! let provider = create_llm_provider("gemini", LlmConfig {
//!     api_key: Some("AIza...".to_string()),
//!     ..Default::default()
//! })?;
//! let model = ModelHandle::new("gemini-1.5-flash", ModelConfig::default());
//! let reply = provider.generate(&model, "What bikes do you sell?").await?;
//! ```

mod base;
pub mod gemini;

use std::sync::Arc;
use tracing::info;

pub use base::{LlmConfig, LlmProvider, ProviderError, ProviderResult, SharedLlmProvider};
pub use gemini::{GEMINI_API_BASE_URL, GeminiProvider};

/// Supported text-generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    /// Google Gemini `generateContent`
    Gemini,
}

impl LlmProviderKind {
    /// Parse provider from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" | "google-gemini" => Some(Self::Gemini),
            _ => None,
        }
    }
}

impl std::fmt::Display for LlmProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Factory function to create a text-generation provider.
///
/// # Supported Providers
///
/// - `"gemini"` / `"google"` - Google Gemini
pub fn create_llm_provider(name: &str, config: LlmConfig) -> ProviderResult<SharedLlmProvider> {
    match LlmProviderKind::parse(name) {
        Some(kind @ LlmProviderKind::Gemini) => {
            info!(provider = %kind, "Creating LLM provider");
            Ok(Arc::new(GeminiProvider::new(config)?))
        }
        None => Err(ProviderError::InvalidConfiguration(format!(
            "Unsupported LLM provider: {name}. Supported: {:?}",
            get_supported_llm_providers()
        ))),
    }
}

/// Names accepted by [`create_llm_provider`].
pub fn get_supported_llm_providers() -> Vec<&'static str> {
    vec!["gemini"]
}
