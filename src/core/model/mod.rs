//! Shared model binding and its startup initialization.

mod handle;
pub mod initializer;
mod slot;

pub use handle::{DEFAULT_SYSTEM_INSTRUCTION, DEFAULT_TEMPERATURE, ModelConfig, ModelHandle};
pub use initializer::{DEFAULT_MODEL_CANDIDATES, DEFAULT_PROBE_PROMPT, ModelInitializer};
pub use slot::{ModelSlot, ModelState, ModelStatus};
