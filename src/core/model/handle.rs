use serde::{Deserialize, Serialize};

/// Default single-topic instruction sent with every request.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a friendly AI assistant. You only talk about Revolt Motors. \
If asked about any other topic, politely say: 'I only provide information about Revolt Motors.' \
Always be concise and helpful.";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Generation settings bound into every [`ModelHandle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Sampling temperature (0.0 to 2.0)
    pub temperature: f32,
    /// System instruction restricting the assistant's topic
    pub system_instruction: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

/// A provider model binding: identifier plus generation settings.
///
/// Immutable once built. The committed handle is shared by every connection
/// through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandle {
    id: String,
    config: ModelConfig,
}

impl ModelHandle {
    pub fn new(id: impl Into<String>, config: ModelConfig) -> Self {
        Self {
            id: id.into(),
            config,
        }
    }

    /// Provider model identifier (e.g. "gemini-1.5-flash")
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}
