//! Gemini provider implementation.
//!
//! # API Reference
//!
//! - Endpoint: `POST {base}/v1beta/models/{model}:generateContent`
//! - Auth: `x-goog-api-key` header
//! - Models: gemini-1.5-flash, gemini-1.5-pro, and any newer id the key can see

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use super::messages::{
    Content, ErrorResponse, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use crate::core::llm::base::{LlmConfig, LlmProvider, ProviderError, ProviderResult};
use crate::core::model::ModelHandle;

/// Public Gemini API root
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// API version segment used for every call
const GEMINI_API_VERSION: &str = "v1beta";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` client
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    ///
    /// A missing API key is accepted; the first call will then fail with an
    /// authentication error from the upstream service.
    pub fn new(config: LlmConfig) -> ProviderResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| GEMINI_API_BASE_URL.to_string());
        Url::parse(&base_url).map_err(|e| {
            ProviderError::InvalidConfiguration(format!("invalid Gemini base URL '{base_url}': {e}"))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ProviderError::InvalidConfiguration(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.filter(|k| !k.is_empty()),
        })
    }

    /// URL of the `generateContent` method for `model_id`.
    ///
    /// Accepts both bare ids and the `models/` resource form.
    pub fn endpoint(&self, model_id: &str) -> String {
        let model = model_id.strip_prefix("models/").unwrap_or(model_id);
        format!(
            "{}/{GEMINI_API_VERSION}/models/{model}:generateContent",
            self.base_url
        )
    }

    fn error_for_status(status: StatusCode, body: &str) -> ProviderError {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| match e.error.status {
                Some(code) if !e.error.message.is_empty() => format!("{code}: {}", e.error.message),
                Some(code) => code,
                None => e.error.message,
            })
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::Authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
            _ => ProviderError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, model: &ModelHandle, prompt: &str) -> ProviderResult<String> {
        let config = model.config();
        let body = GenerateContentRequest {
            system_instruction: (!config.system_instruction.is_empty())
                .then(|| Content::system(&config.system_instruction)),
            contents: vec![Content::user(prompt)],
            generation_config: GenerationConfig {
                temperature: config.temperature,
            },
        };

        let mut request = self.client.post(self.endpoint(model.id())).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        debug!(model = %model.id(), prompt_len = prompt.len(), "Sending generateContent request");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Self::error_for_status(status, &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {e}")))?;

        parsed
            .text()
            .ok_or_else(|| ProviderError::MalformedResponse(parsed.missing_text_reason()))
    }
}
