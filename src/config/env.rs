use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::{
    DEFAULT_GENERATION_TIMEOUT_SECONDS, DEFAULT_HOST, DEFAULT_LLM_PROVIDER, DEFAULT_PORT,
    DEFAULT_QUEUE_COOLDOWN_MS, ServerConfig, TlsConfig,
};
use crate::core::model::{
    DEFAULT_MODEL_CANDIDATES, DEFAULT_PROBE_PROMPT, DEFAULT_SYSTEM_INSTRUCTION,
    DEFAULT_TEMPERATURE,
};

/// Build a configuration from environment variables, falling back to
/// defaults for anything unset.
///
/// Values from a `.env` file are visible here because `main` loads it into
/// the process environment first.
pub fn load_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let tls_enabled = parse_bool("TLS_ENABLED")?.unwrap_or(false);
    let tls = if tls_enabled {
        let cert_path = non_empty("TLS_CERT_PATH")
            .ok_or("TLS_ENABLED is true but TLS_CERT_PATH is not set")?;
        let key_path =
            non_empty("TLS_KEY_PATH").ok_or("TLS_ENABLED is true but TLS_KEY_PATH is not set")?;
        Some(TlsConfig {
            cert_path: PathBuf::from(cert_path),
            key_path: PathBuf::from(key_path),
        })
    } else {
        None
    };

    let model_candidates = non_empty("GEMINI_MODELS")
        .map(|raw| parse_list(&raw))
        .unwrap_or_else(|| {
            DEFAULT_MODEL_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect()
        });

    Ok(ServerConfig {
        host: non_empty("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: parse_env("PORT")?.unwrap_or(DEFAULT_PORT),
        tls,
        llm_provider: non_empty("LLM_PROVIDER").unwrap_or_else(|| DEFAULT_LLM_PROVIDER.to_string()),
        gemini_api_key: non_empty("GEMINI_API_KEY"),
        gemini_base_url: non_empty("GEMINI_BASE_URL"),
        model_candidates,
        model_temperature: parse_env("MODEL_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE),
        system_instruction: non_empty("SYSTEM_INSTRUCTION")
            .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
        probe_prompt: non_empty("PROBE_PROMPT").unwrap_or_else(|| DEFAULT_PROBE_PROMPT.to_string()),
        queue_cooldown_ms: parse_env("QUEUE_COOLDOWN_MS")?.unwrap_or(DEFAULT_QUEUE_COOLDOWN_MS),
        generation_timeout_seconds: parse_env("GENERATION_TIMEOUT_SECONDS")?
            .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECONDS),
        cors_allowed_origins: Some(
            non_empty("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
        ),
    })
}

/// Read a variable, treating empty or whitespace-only values as unset.
fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {name} ('{raw}'): {e}")),
        None => Ok(None),
    }
}

fn parse_bool(name: &str) -> Result<Option<bool>, String> {
    match non_empty(name) {
        Some(raw) => match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(format!("Invalid boolean for {name}: '{raw}'")),
        },
        None => Ok(None),
    }
}

/// Split a comma-separated list, dropping blank entries.
pub(crate) fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
