//! Holder for the process-wide committed model.
//!
//! The slot starts in `Initializing` and moves exactly once, to either
//! `Ready` or `Failed`. Readers never block: the state lives in an
//! [`ArcSwap`] and every read is a pointer load.

use arc_swap::ArcSwap;
use serde::Serialize;
use std::sync::Arc;

use super::ModelHandle;
use crate::errors::{GenerationError, GenerationResult};

/// Initialization state of the shared model.
#[derive(Debug, Clone)]
pub enum ModelState {
    /// Startup probing has not finished yet
    Initializing,
    /// A candidate passed its probe and is serving requests
    Ready(Arc<ModelHandle>),
    /// Every candidate failed; generation stays unavailable until restart
    Failed(String),
}

/// Serializable view of the slot for the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct ModelSlot {
    state: ArcSwap<ModelState>,
}

impl Default for ModelSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSlot {
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(ModelState::Initializing),
        }
    }

    /// A slot already holding `handle`.
    pub fn ready(handle: ModelHandle) -> Self {
        Self {
            state: ArcSwap::from_pointee(ModelState::Ready(Arc::new(handle))),
        }
    }

    pub fn state(&self) -> Arc<ModelState> {
        self.state.load_full()
    }

    /// The committed handle, or `ModelNotInitialized` if there is none.
    pub fn current(&self) -> GenerationResult<Arc<ModelHandle>> {
        match &**self.state.load() {
            ModelState::Ready(handle) => Ok(Arc::clone(handle)),
            ModelState::Initializing | ModelState::Failed(_) => {
                Err(GenerationError::ModelNotInitialized)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(**self.state.load(), ModelState::Ready(_))
    }

    /// Commit `handle` if the slot is still initializing.
    ///
    /// Returns `false` and leaves the slot untouched when a handle was already
    /// committed or initialization already failed.
    pub fn commit(&self, handle: Arc<ModelHandle>) -> bool {
        let previous = self.state.rcu(|current| match **current {
            ModelState::Initializing => Arc::new(ModelState::Ready(Arc::clone(&handle))),
            _ => Arc::clone(current),
        });
        matches!(*previous, ModelState::Initializing)
    }

    /// Record that initialization failed. No-op once a handle is committed.
    pub fn mark_failed(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        let previous = self.state.rcu(|current| match **current {
            ModelState::Initializing => Arc::new(ModelState::Failed(reason.clone())),
            _ => Arc::clone(current),
        });
        matches!(*previous, ModelState::Initializing)
    }

    pub fn status(&self) -> ModelStatus {
        match &**self.state.load() {
            ModelState::Initializing => ModelStatus {
                state: "initializing",
                model: None,
                error: None,
            },
            ModelState::Ready(handle) => ModelStatus {
                state: "ready",
                model: Some(handle.id().to_string()),
                error: None,
            },
            ModelState::Failed(reason) => ModelStatus {
                state: "failed",
                model: None,
                error: Some(reason.clone()),
            },
        }
    }
}
