//! Configuration module for the voice relay server
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use voice_relay::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

mod env;
mod merge;
mod validation;
mod yaml;

use crate::core::llm::LlmConfig;
use crate::core::model::{
    DEFAULT_MODEL_CANDIDATES, DEFAULT_PROBE_PROMPT, DEFAULT_SYSTEM_INSTRUCTION,
    DEFAULT_TEMPERATURE, ModelConfig,
};
use crate::core::queue::QueueConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LLM_PROVIDER: &str = "gemini";
pub const DEFAULT_QUEUE_COOLDOWN_MS: u64 = 800;
pub const DEFAULT_GENERATION_TIMEOUT_SECONDS: u64 = 30;

/// Connect timeout for outbound provider calls
const PROVIDER_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains all configuration needed to run the relay, including:
/// - Server settings (host, port, TLS)
/// - Provider credential and endpoint
/// - Model candidates and generation settings
/// - Per-connection queue timing
/// - CORS
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Provider settings
    pub llm_provider: String,
    /// Gemini API key. Missing keys are logged at startup but do not stop
    /// the server; generation will fail until one is configured.
    pub gemini_api_key: Option<String>,
    /// Override for the Gemini API root
    pub gemini_base_url: Option<String>,

    // Model settings
    /// Fallback order for startup probing
    pub model_candidates: Vec<String>,
    pub model_temperature: f32,
    pub system_instruction: String,
    pub probe_prompt: String,

    // Queue settings
    /// Pause after each generation on a connection
    pub queue_cooldown_ms: u64,
    /// Upper bound on one generation call; 0 disables the timeout
    pub generation_timeout_seconds: u64,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tls: None,
            llm_provider: DEFAULT_LLM_PROVIDER.to_string(),
            gemini_api_key: None,
            gemini_base_url: None,
            model_candidates: DEFAULT_MODEL_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            model_temperature: DEFAULT_TEMPERATURE,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            probe_prompt: DEFAULT_PROBE_PROMPT.to_string(),
            queue_cooldown_ms: DEFAULT_QUEUE_COOLDOWN_MS,
            generation_timeout_seconds: DEFAULT_GENERATION_TIMEOUT_SECONDS,
            cors_allowed_origins: Some("*".to_string()),
        }
    }
}

/// Zeroize the provider credential when the configuration is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.gemini_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables only
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or the resulting
    /// configuration fails validation.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // Note: .env file is loaded in main.rs at application startup
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Whether a provider credential is configured
    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Provider connection settings
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.gemini_api_key.clone(),
            base_url: self.gemini_base_url.clone(),
            connect_timeout: Some(PROVIDER_CONNECT_TIMEOUT),
        }
    }

    /// Generation settings bound into the model handle
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            temperature: self.model_temperature,
            system_instruction: self.system_instruction.clone(),
        }
    }

    /// Timing for each connection's request queue
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            cooldown: Duration::from_millis(self.queue_cooldown_ms),
            job_timeout: (self.generation_timeout_seconds > 0)
                .then(|| Duration::from_secs(self.generation_timeout_seconds)),
        }
    }
}
