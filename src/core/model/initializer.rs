//! Startup model selection.
//!
//! Candidates are probed strictly in order. The first one that answers a
//! trivial prompt is committed and probing stops; the rest are never
//! contacted.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::{ModelConfig, ModelHandle, ModelSlot};
use crate::core::llm::SharedLlmProvider;
use crate::errors::{CandidateFailure, InitializationError};

/// Models tried when none are configured, in fallback order
pub const DEFAULT_MODEL_CANDIDATES: &[&str] = &["gemini-1.5-flash", "gemini-1.5-pro"];

/// Prompt used for the liveness probe
pub const DEFAULT_PROBE_PROMPT: &str = "hello";

/// Probes candidate models and commits the first working one.
pub struct ModelInitializer {
    provider: SharedLlmProvider,
    candidates: Vec<String>,
    config: ModelConfig,
    probe_prompt: String,
}

impl ModelInitializer {
    pub fn new(provider: SharedLlmProvider, candidates: Vec<String>, config: ModelConfig) -> Self {
        Self {
            provider,
            candidates,
            config,
            probe_prompt: DEFAULT_PROBE_PROMPT.to_string(),
        }
    }

    pub fn with_probe_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.probe_prompt = prompt.into();
        self
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Probe candidates in order and return the first handle that works.
    ///
    /// A failed probe is logged and the next candidate is tried. Fails with
    /// [`InitializationError`] when the list is empty or exhausted.
    pub async fn initialize(&self) -> Result<ModelHandle, InitializationError> {
        if self.candidates.is_empty() {
            return Err(InitializationError::NoCandidates);
        }

        let mut attempts = Vec::with_capacity(self.candidates.len());
        for name in &self.candidates {
            let handle = ModelHandle::new(name.clone(), self.config.clone());
            match self.provider.generate(&handle, &self.probe_prompt).await {
                Ok(_) => {
                    info!(
                        model = %name,
                        provider = self.provider.name(),
                        "Model ready"
                    );
                    return Ok(handle);
                }
                Err(e) => {
                    warn!(model = %name, error = %e, "Model probe failed");
                    attempts.push(CandidateFailure {
                        model: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(InitializationError::AllCandidatesFailed { attempts })
    }

    /// Run [`initialize`](Self::initialize) and record the outcome in `slot`.
    ///
    /// On failure the slot is marked failed and stays that way; there is no
    /// automatic retry.
    pub async fn initialize_into(
        &self,
        slot: &ModelSlot,
    ) -> Result<Arc<ModelHandle>, InitializationError> {
        match self.initialize().await {
            Ok(handle) => {
                let handle = Arc::new(handle);
                if !slot.commit(Arc::clone(&handle)) {
                    warn!(model = %handle.id(), "Model slot was already settled, keeping existing state");
                }
                Ok(handle)
            }
            Err(e) => {
                error!(error = %e, "Model initialization failed, generation is unavailable");
                slot.mark_failed(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::llm::{LlmProvider, ProviderError, ProviderResult};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;

    /// Provider that succeeds only for the listed model ids
    struct ProbeProvider {
        working: HashSet<String>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ProbeProvider {
        fn new(working: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                working: working.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn probed(&self) -> Vec<String> {
            self.calls.lock().iter().map(|(m, _)| m.clone()).collect()
        }
    }

    #[async_trait]
    impl LlmProvider for ProbeProvider {
        fn name(&self) -> &'static str {
            "probe"
        }

        async fn generate(&self, model: &ModelHandle, prompt: &str) -> ProviderResult<String> {
            self.calls
                .lock()
                .push((model.id().to_string(), prompt.to_string()));
            if self.working.contains(model.id()) {
                Ok("hi".to_string())
            } else {
                Err(ProviderError::Api {
                    status: 404,
                    message: format!("models/{} is not found", model.id()),
                })
            }
        }
    }

    fn candidates(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_falls_back_to_second_candidate() {
        let provider = ProbeProvider::new(&["b"]);
        let init = ModelInitializer::new(
            provider.clone(),
            candidates(&["a", "b"]),
            ModelConfig::default(),
        );

        let handle = init.initialize().await.unwrap();
        assert_eq!(handle.id(), "b");
        assert_eq!(provider.probed(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let provider = ProbeProvider::new(&["a", "b"]);
        let init = ModelInitializer::new(
            provider.clone(),
            candidates(&["a", "b", "c"]),
            ModelConfig::default(),
        );

        let handle = init.initialize().await.unwrap();
        assert_eq!(handle.id(), "a");
        assert_eq!(provider.probed(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let provider = ProbeProvider::new(&[]);
        let init = ModelInitializer::new(
            provider.clone(),
            candidates(&["a", "b"]),
            ModelConfig::default(),
        );
        let slot = ModelSlot::new();

        let err = init.initialize_into(&slot).await.unwrap_err();
        match err {
            InitializationError::AllCandidatesFailed { attempts } => {
                let models: Vec<_> = attempts.iter().map(|a| a.model.as_str()).collect();
                assert_eq!(models, vec!["a", "b"]);
                assert!(attempts[0].reason.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!slot.is_ready());
        assert_eq!(slot.status().state, "failed");
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let provider = ProbeProvider::new(&["a"]);
        let init = ModelInitializer::new(provider.clone(), Vec::new(), ModelConfig::default());
        assert!(matches!(
            init.initialize().await,
            Err(InitializationError::NoCandidates)
        ));
        assert!(provider.probed().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_into_commits_handle_with_config() {
        let provider = ProbeProvider::new(&["b"]);
        let config = ModelConfig {
            temperature: 0.2,
            system_instruction: "Only talk about bikes.".to_string(),
        };
        let init = ModelInitializer::new(provider.clone(), candidates(&["a", "b"]), config.clone())
            .with_probe_prompt("ping");
        let slot = ModelSlot::new();

        let handle = init.initialize_into(&slot).await.unwrap();
        assert_eq!(handle.id(), "b");
        assert_eq!(handle.config(), &config);
        assert_eq!(slot.current().unwrap().id(), "b");
        assert!(provider.calls.lock().iter().all(|(_, p)| p == "ping"));
    }
}
