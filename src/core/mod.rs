pub mod llm;
pub mod model;
pub mod queue;

// Re-export commonly used types for convenience
pub use llm::{
    GeminiProvider, LlmConfig, LlmProvider, LlmProviderKind, ProviderError, ProviderResult,
    SharedLlmProvider, create_llm_provider, get_supported_llm_providers,
};

pub use model::{
    ModelConfig, ModelHandle, ModelInitializer, ModelSlot, ModelState, ModelStatus,
};

pub use queue::{JobHandle, QueueConfig, QueueError, QueueState, RequestQueue};
