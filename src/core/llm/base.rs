//! Base traits and types for text-generation providers.
//!
//! A provider turns one prompt into one reply against a bound model. It does
//! not retry, cache, or keep conversation state: every call is independent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::model::ModelHandle;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during a single generation call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The provider rejected the credential
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The provider reported a quota or rate-limit violation
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other non-success status from the provider
    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response could not be interpreted as a text reply
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Whether the same request may succeed if sent again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Authentication(_) | Self::MalformedResponse(_) | Self::InvalidConfiguration(_) => {
                false
            }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

// =============================================================================
// Configuration Types
// =============================================================================

/// Connection settings shared by every model a provider serves.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for authentication. Calls are still attempted when absent.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Override for the provider's API root (used by tests and proxies)
    #[serde(default)]
    pub base_url: Option<String>,

    /// TCP connect timeout for outbound calls
    #[serde(default)]
    pub connect_timeout: Option<Duration>,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

// =============================================================================
// Provider Trait
// =============================================================================

/// A text-generation backend.
///
/// Implementations must be safe to call concurrently from many connection
/// queues: the handle is read-only and each call is a standalone request.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name used in logs (e.g. "gemini").
    fn name(&self) -> &'static str;

    /// Generate a reply for `prompt` using the model bound in `model`.
    ///
    /// One outbound request per invocation, no retries.
    async fn generate(&self, model: &ModelHandle, prompt: &str) -> ProviderResult<String>;
}

/// Shared provider reference held by the application state.
pub type SharedLlmProvider = Arc<dyn LlmProvider>;
