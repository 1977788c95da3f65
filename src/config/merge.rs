use std::path::PathBuf;

use super::yaml::YamlConfig;
use super::{ServerConfig, TlsConfig, env};

/// Merge environment configuration (base) with optional YAML overrides.
///
/// YAML wins for every field it sets. TLS from YAML replaces the env TLS
/// block entirely when `tls.enabled` is present.
pub fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = env::load_from_env()?;
    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(tls) = server.tls
            && let Some(enabled) = tls.enabled
        {
            config.tls = if enabled {
                let cert_path = tls
                    .cert_path
                    .or_else(|| config.tls.as_ref().map(|t| t.cert_path.display().to_string()))
                    .ok_or("server.tls.enabled is true but cert_path is not set")?;
                let key_path = tls
                    .key_path
                    .or_else(|| config.tls.as_ref().map(|t| t.key_path.display().to_string()))
                    .ok_or("server.tls.enabled is true but key_path is not set")?;
                Some(TlsConfig {
                    cert_path: PathBuf::from(cert_path),
                    key_path: PathBuf::from(key_path),
                })
            } else {
                None
            };
        }
    }

    if let Some(provider) = yaml.provider {
        if let Some(name) = provider.name {
            config.llm_provider = name;
        }
        if provider.api_key.is_some() {
            config.gemini_api_key = provider.api_key;
        }
        if provider.base_url.is_some() {
            config.gemini_base_url = provider.base_url;
        }
    }

    if let Some(model) = yaml.model {
        if let Some(candidates) = model.candidates {
            config.model_candidates = candidates
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }
        if let Some(temperature) = model.temperature {
            config.model_temperature = temperature;
        }
        if let Some(instruction) = model.system_instruction {
            config.system_instruction = instruction;
        }
        if let Some(prompt) = model.probe_prompt {
            config.probe_prompt = prompt;
        }
    }

    if let Some(queue) = yaml.queue {
        if let Some(cooldown) = queue.cooldown_ms {
            config.queue_cooldown_ms = cooldown;
        }
        if let Some(timeout) = queue.generation_timeout_seconds {
            config.generation_timeout_seconds = timeout;
        }
    }

    if let Some(security) = yaml.security
        && security.cors_allowed_origins.is_some()
    {
        config.cors_allowed_origins = security.cors_allowed_origins;
    }

    Ok(config)
}
