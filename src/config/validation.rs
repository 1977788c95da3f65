use url::Url;

use super::{ServerConfig, TlsConfig};

/// Validate a merged configuration before the server uses it.
pub fn validate(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_candidates(&config.model_candidates)?;
    validate_temperature(config.model_temperature)?;
    validate_base_url(config.gemini_base_url.as_deref())?;
    validate_tls(config.tls.as_ref())?;
    Ok(())
}

pub fn validate_candidates(candidates: &[String]) -> Result<(), String> {
    if candidates.iter().all(|c| c.trim().is_empty()) {
        return Err("At least one model candidate must be configured (GEMINI_MODELS)".to_string());
    }
    Ok(())
}

pub fn validate_temperature(temperature: f32) -> Result<(), String> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(format!(
            "MODEL_TEMPERATURE must be between 0.0 and 2.0, got {temperature}"
        ));
    }
    Ok(())
}

pub fn validate_base_url(base_url: Option<&str>) -> Result<(), String> {
    if let Some(raw) = base_url {
        let url = Url::parse(raw).map_err(|e| format!("Invalid GEMINI_BASE_URL '{raw}': {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "GEMINI_BASE_URL must use http or https, got '{}'",
                url.scheme()
            ));
        }
    }
    Ok(())
}

pub fn validate_tls(tls: Option<&TlsConfig>) -> Result<(), String> {
    if let Some(tls) = tls {
        if !tls.cert_path.exists() {
            return Err(format!(
                "TLS certificate not found: {}",
                tls.cert_path.display()
            ));
        }
        if !tls.key_path.exists() {
            return Err(format!("TLS key not found: {}", tls.key_path.display()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_candidates_must_not_be_blank() {
        assert!(validate_candidates(&[]).is_err());
        assert!(validate_candidates(&["  ".to_string()]).is_err());
        assert!(validate_candidates(&["gemini-1.5-flash".to_string()]).is_ok());
    }

    #[test]
    fn test_temperature_range() {
        assert!(validate_temperature(0.0).is_ok());
        assert!(validate_temperature(2.0).is_ok());
        assert!(validate_temperature(-0.1).is_err());
        assert!(validate_temperature(2.5).is_err());
    }

    #[test]
    fn test_base_url_scheme() {
        assert!(validate_base_url(None).is_ok());
        assert!(validate_base_url(Some("http://127.0.0.1:9000")).is_ok());
        assert!(validate_base_url(Some("ftp://example.com")).is_err());
        assert!(validate_base_url(Some("::::")).is_err());
    }

    #[test]
    fn test_tls_files_must_exist() {
        let tls = TlsConfig {
            cert_path: PathBuf::from("/nonexistent/cert.pem"),
            key_path: PathBuf::from("/nonexistent/key.pem"),
        };
        assert!(validate_tls(Some(&tls)).is_err());
        assert!(validate_tls(None).is_ok());
    }
}
