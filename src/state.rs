use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::llm::{ProviderResult, SharedLlmProvider, create_llm_provider};
use crate::core::model::{ModelInitializer, ModelSlot};

/// Application state shared by every HTTP handler and WebSocket session
pub struct AppState {
    pub config: ServerConfig,
    /// Provider used for both startup probes and per-transcript generation
    pub provider: SharedLlmProvider,
    /// Model committed by startup initialization
    pub model: Arc<ModelSlot>,
}

impl AppState {
    /// Build state with the provider named in the configuration.
    ///
    /// A missing API key is only a warning: the server still starts, and
    /// probes fail until one is configured.
    pub fn new(config: ServerConfig) -> ProviderResult<Arc<Self>> {
        if !config.has_api_key() {
            warn!("GEMINI_API_KEY is not set; model initialization will fail until it is configured");
        }

        let provider = create_llm_provider(&config.llm_provider, config.llm_config())?;
        info!(provider = provider.name(), "Text generation provider configured");

        Ok(Self::with_provider(config, provider))
    }

    /// Build state around an already constructed provider.
    pub fn with_provider(config: ServerConfig, provider: SharedLlmProvider) -> Arc<Self> {
        Arc::new(Self {
            config,
            provider,
            model: Arc::new(ModelSlot::new()),
        })
    }

    /// Initializer configured from this state's settings
    pub fn initializer(&self) -> ModelInitializer {
        ModelInitializer::new(
            Arc::clone(&self.provider),
            self.config.model_candidates.clone(),
            self.config.model_config(),
        )
        .with_probe_prompt(self.config.probe_prompt.clone())
    }

    /// Probe the configured candidates in the background and commit the
    /// first that works into [`AppState::model`].
    ///
    /// Connections accepted before this finishes get a "not initialized"
    /// reply for any transcript they send.
    pub fn spawn_model_initialization(self: &Arc<Self>) -> JoinHandle<()> {
        let state = Arc::clone(self);
        tokio::spawn(async move {
            let initializer = state.initializer();
            info!(
                candidates = ?initializer.candidates(),
                "Starting model initialization"
            );
            // Failures are logged and recorded in the slot by initialize_into
            let _ = initializer.initialize_into(&state.model).await;
        })
    }
}
