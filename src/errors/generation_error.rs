use thiserror::Error;

use crate::core::llm::ProviderError;

/// Reply text used when a failure carries no message worth showing.
pub const GENERIC_RETRY_MESSAGE: &str =
    "I hit a snag processing that. Please try again in a moment.";

/// Failure of one queued generation job.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The model slot holds no committed handle (still initializing, or
    /// initialization failed).
    #[error("Model not initialized. Please try again in a moment.")]
    ModelNotInitialized,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl GenerationError {
    /// Text shown to the user in place of a reply.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_RETRY_MESSAGE.to_string()
        } else {
            message
        }
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_uses_error_text() {
        let err = GenerationError::from(ProviderError::RateLimited("quota exhausted".into()));
        assert_eq!(err.user_message(), "Rate limit exceeded: quota exhausted");
    }

    #[test]
    fn test_uninitialized_message_is_retryable_hint() {
        assert_eq!(
            GenerationError::ModelNotInitialized.user_message(),
            "Model not initialized. Please try again in a moment."
        );
    }
}
