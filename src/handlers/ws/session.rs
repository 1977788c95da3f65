//! Per-connection session state
//!
//! Each WebSocket connection owns one [`ConnectionSession`]. Transcripts are
//! turned into generation jobs on the session's private [`RequestQueue`], so
//! a single connection never has more than one provider call in flight and
//! different connections never wait on each other.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::llm::SharedLlmProvider;
use crate::core::model::ModelSlot;
use crate::core::queue::{JobHandle, QueueConfig, QueueError, RequestQueue};
use crate::errors::{GENERIC_RETRY_MESSAGE, GenerationError, GenerationResult};

/// Outcome of one queued transcript
pub type ReplyOutcome = Result<GenerationResult<String>, QueueError>;

pub struct ConnectionSession {
    queue: RequestQueue<GenerationResult<String>>,
    provider: SharedLlmProvider,
    model: Arc<ModelSlot>,
}

impl ConnectionSession {
    /// Create a session with a fresh queue.
    ///
    /// Must be called inside a tokio runtime. The queue worker inherits the
    /// current tracing span.
    pub fn new(
        provider: SharedLlmProvider,
        model: Arc<ModelSlot>,
        queue_config: QueueConfig,
    ) -> Self {
        Self {
            queue: RequestQueue::new(queue_config),
            provider,
            model,
        }
    }

    /// Jobs waiting behind the one currently running
    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    /// Queue a generation job for `text`.
    ///
    /// Returns `None` for empty or whitespace-only text; nothing is queued.
    /// Other text is sent as received. The committed model is read when the
    /// job starts, not when it is queued.
    pub fn submit_transcript(&self, text: &str) -> Option<JobHandle<GenerationResult<String>>> {
        if text.trim().is_empty() {
            debug!("Ignoring blank transcript");
            return None;
        }

        let prompt = text.to_string();
        let provider = Arc::clone(&self.provider);
        let model = Arc::clone(&self.model);

        let handle = self.queue.push(move || async move {
            let handle = model.current().inspect_err(|_| {
                warn!("Transcript received before a model was initialized");
            })?;
            let reply = provider.generate(&handle, &prompt).await?;
            Ok::<_, GenerationError>(reply)
        });

        debug!(job_id = handle.id(), pending = self.queue.pending(), "Transcript queued");
        Some(handle)
    }
}

/// Text to emit as the `ai-reply` for a settled job.
pub fn reply_text(outcome: ReplyOutcome) -> String {
    match outcome {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => {
            if let GenerationError::Provider(err) = &e {
                warn!(error = %err, retryable = err.is_retryable(), "Generation failed");
            }
            e.user_message()
        }
        Err(QueueError::TimedOut(after)) => {
            warn!(timeout = ?after, "Generation timed out");
            format!(
                "Sorry, that took too long (over {}s). Please try again.",
                after.as_secs()
            )
        }
        Err(e) => {
            warn!(error = %e, "Generation job did not complete");
            GENERIC_RETRY_MESSAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::llm::{LlmProvider, ProviderError, ProviderResult};
    use crate::core::model::{ModelConfig, ModelHandle};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Provider replaying scripted results, each after `delay`
    struct ScriptedProvider {
        script: Mutex<VecDeque<ProviderResult<String>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl ScriptedProvider {
        fn new(script: Vec<ProviderResult<String>>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn generate(&self, _model: &ModelHandle, prompt: &str) -> ProviderResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().push(prompt.to_string());
            tokio::time::sleep(self.delay).await;
            self.script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok("default reply".to_string()))
        }
    }

    fn ready_slot() -> Arc<ModelSlot> {
        Arc::new(ModelSlot::ready(ModelHandle::new(
            "gemini-1.5-flash",
            ModelConfig::default(),
        )))
    }

    fn fast_queue() -> QueueConfig {
        QueueConfig {
            cooldown: Duration::from_millis(20),
            job_timeout: None,
        }
    }

    #[tokio::test]
    async fn test_whitespace_transcript_queues_nothing() {
        let provider = ScriptedProvider::new(vec![], Duration::ZERO);
        let session = ConnectionSession::new(provider.clone(), ready_slot(), fast_queue());

        assert!(session.submit_transcript("").is_none());
        assert!(session.submit_transcript("   \n\t").is_none());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_transcript_is_sent_as_received() {
        let provider = ScriptedProvider::new(vec![Ok("Sure.".to_string())], Duration::ZERO);
        let session = ConnectionSession::new(provider.clone(), ready_slot(), fast_queue());

        let handle = session.submit_transcript("  tell me about RV400  ").unwrap();
        assert_eq!(reply_text(handle.await), "Sure.");
        assert_eq!(provider.prompts.lock().as_slice(), ["  tell me about RV400  "]);
    }

    #[tokio::test]
    async fn test_failure_yields_fallback_and_next_job_runs() {
        let provider = ScriptedProvider::new(
            vec![
                Err(ProviderError::RateLimited("quota exhausted".to_string())),
                Ok("second answer".to_string()),
            ],
            Duration::ZERO,
        );
        let session = ConnectionSession::new(provider.clone(), ready_slot(), fast_queue());

        let first = session.submit_transcript("first").unwrap();
        let second = session.submit_transcript("second").unwrap();

        let first_text = reply_text(first.await);
        assert!(first_text.contains("quota exhausted"), "got {first_text}");
        assert_eq!(reply_text(second.await), "second answer");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_uninitialized_model_reply() {
        let provider = ScriptedProvider::new(vec![], Duration::ZERO);
        let session = ConnectionSession::new(
            provider.clone(),
            Arc::new(ModelSlot::new()),
            fast_queue(),
        );

        let handle = session.submit_transcript("hello").unwrap();
        assert_eq!(
            reply_text(handle.await),
            "Model not initialized. Please try again in a moment."
        );
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_model_is_read_when_job_starts() {
        let provider = ScriptedProvider::new(vec![Ok("late but ready".to_string())], Duration::ZERO);
        let slot = Arc::new(ModelSlot::new());
        let session = ConnectionSession::new(provider.clone(), Arc::clone(&slot), fast_queue());

        // The first job's cooldown leaves time to commit before the second starts
        let first = session.submit_transcript("first").unwrap();
        let second = session.submit_transcript("second").unwrap();
        assert!(reply_text(first.await).contains("not initialized"));

        slot.commit(Arc::new(ModelHandle::new(
            "gemini-1.5-pro",
            ModelConfig::default(),
        )));
        assert_eq!(reply_text(second.await), "late but ready");
    }

    #[tokio::test]
    async fn test_dropping_session_abandons_queued_jobs() {
        let provider = ScriptedProvider::new(vec![], Duration::from_millis(100));
        let session = ConnectionSession::new(provider.clone(), ready_slot(), fast_queue());

        let first = session.submit_transcript("one").unwrap();
        let second = session.submit_transcript("two").unwrap();
        let third = session.submit_transcript("three").unwrap();

        // Wait until the first job is in flight, then disconnect
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(provider.calls(), 1);
        drop(session);

        assert_eq!(second.await.err(), Some(QueueError::Abandoned));
        assert_eq!(third.await.err(), Some(QueueError::Abandoned));
        drop(first);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_reply_mentions_limit() {
        let text = reply_text(Err(QueueError::TimedOut(Duration::from_secs(30))));
        assert!(text.contains("30s"));
    }

    #[tokio::test]
    async fn test_queue_failures_use_generic_message() {
        assert_eq!(reply_text(Err(QueueError::JobPanicked)), GENERIC_RETRY_MESSAGE);
        assert_eq!(reply_text(Err(QueueError::Abandoned)), GENERIC_RETRY_MESSAGE);
    }
}
