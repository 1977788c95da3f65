use serde::Deserialize;
use std::path::Path;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration; anything left out
/// keeps the value from the environment (or the built-in default).
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 5000
///   tls:
///     enabled: false
///
/// provider:
///   name: "gemini"
///   api_key: "your-gemini-key"
///   base_url: "https://generativelanguage.googleapis.com"
///
/// model:
///   candidates:
///     - "gemini-1.5-flash"
///     - "gemini-1.5-pro"
///   temperature: 0.7
///   system_instruction: "You only talk about Revolt Motors."
///   probe_prompt: "hello"
///
/// queue:
///   cooldown_ms: 800
///   generation_timeout_seconds: 30
///
/// security:
///   cors_allowed_origins: "*"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub provider: Option<ProviderYaml>,
    pub model: Option<ModelYaml>,
    pub queue: Option<QueueYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Text-generation provider settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProviderYaml {
    pub name: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Model selection and generation settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ModelYaml {
    /// Fallback order; the first model whose probe succeeds is used
    pub candidates: Option<Vec<String>>,
    pub temperature: Option<f32>,
    pub system_instruction: Option<String>,
    pub probe_prompt: Option<String>,
}

/// Per-connection queue settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct QueueYaml {
    pub cooldown_ms: Option<u64>,
    /// 0 disables the timeout
    pub generation_timeout_seconds: Option<u64>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub cors_allowed_origins: Option<String>,
}

impl YamlConfig {
    /// Load YAML configuration from file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file {}: {e}", path.display()))?;
        Ok(config)
    }
}
