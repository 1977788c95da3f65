//! Startup probe for checking provider credentials and model candidates
//! without starting the server.
//!
//! This module hosts the logic that powers the `voice-relay probe` CLI
//! command. It runs the same fallback probe the server runs at startup and
//! reports which candidate would be committed.
//!
//! Typical usage from the CLI:
//!
//! ```text
//! $ GEMINI_API_KEY=... GEMINI_MODELS=gemini-2.0-flash,gemini-1.5-flash voice-relay probe
//! ```
//!
//! If you prefer to invoke the probe programmatically, call [`run`] inside an
//! async context:
//!
//! ```rust,no_run
//! use voice_relay::{ServerConfig, init};
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let config = ServerConfig::from_env().unwrap();
//!     let model = init::run(&config).await.expect("no usable model");
//!     println!("{model}");
//! });
//! ```

use anyhow::{Context, Result, bail};

use crate::config::ServerConfig;
use crate::core::llm::create_llm_provider;
use crate::core::model::ModelInitializer;

/// Probe the configured candidates in order and return the id of the first
/// one that answers.
pub async fn run(config: &ServerConfig) -> Result<String> {
    if !config.has_api_key() {
        bail!("GEMINI_API_KEY must be set to run `voice-relay probe`");
    }

    let provider = create_llm_provider(&config.llm_provider, config.llm_config())
        .context("Failed to create text generation provider")?;

    let initializer = ModelInitializer::new(
        provider,
        config.model_candidates.clone(),
        config.model_config(),
    )
    .with_probe_prompt(config.probe_prompt.clone());

    tracing::info!(
        candidates = ?initializer.candidates(),
        "Probing model candidates"
    );
    let handle = initializer.initialize().await?;

    tracing::info!(model = %handle.id(), "Probe succeeded");
    Ok(handle.id().to_string())
}
