//! Per-connection serialized request queue.
//!
//! Every connection owns one [`RequestQueue`]. Jobs are consumed by a single
//! worker task in arrival order, and each settled job is followed by a
//! cooldown before the next one may start. This keeps a chatty client from
//! tripping the upstream provider's rate limits.
//!
//! State machine of the worker:
//!
//! ```text
//! Idle --job--> Busy --settled--> CoolingDown --cooldown elapsed--> Idle
//!   \______________________ shutdown ________________________/--> Stopped
//! ```
//!
//! Dropping the queue stops the worker. A job that is already running is
//! allowed to finish; jobs still waiting are abandoned without running.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

/// Default pause after each settled job
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(800);

/// Queue timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Idle interval enforced after every job, success or failure
    pub cooldown: Duration,
    /// Upper bound on a single job's run time. `None` waits forever.
    pub job_timeout: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            job_timeout: None,
        }
    }
}

/// Observable worker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Waiting for the next job
    Idle,
    /// A job is executing
    Busy,
    /// A job settled; waiting out the cooldown
    CoolingDown,
    /// The worker has exited; no further jobs will run
    Stopped,
}

/// Failures raised by the queue itself rather than by the job
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("request queue is closed")]
    Closed,

    #[error("request was abandoned before it ran")]
    Abandoned,

    #[error("request timed out after {0:?}")]
    TimedOut(Duration),

    #[error("request handler panicked")]
    JobPanicked,
}

type BoxedJob<T> = Box<dyn FnOnce() -> BoxFuture<'static, T> + Send>;

struct QueuedJob<T> {
    id: u64,
    run: BoxedJob<T>,
    reply: oneshot::Sender<Result<T, QueueError>>,
}

/// Future resolving to the outcome of one pushed job.
///
/// Dropping the handle before the job starts causes the worker to skip it.
#[must_use = "a dropped JobHandle discards the job's result"]
pub struct JobHandle<T> {
    id: u64,
    rx: oneshot::Receiver<Result<T, QueueError>>,
}

impl<T> JobHandle<T> {
    /// Sequence number of the job within its queue
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> Unpin for JobHandle<T> {}

impl<T> Future for JobHandle<T> {
    type Output = Result<T, QueueError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // Sender dropped without a reply: the worker discarded the job
            Poll::Ready(Err(_)) => Poll::Ready(Err(QueueError::Abandoned)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// FIFO, single-flight job queue with a mandatory cooldown between jobs.
///
/// Must be created inside a tokio runtime; the worker task is spawned on
/// construction and inherits the caller's tracing span.
pub struct RequestQueue<T> {
    jobs: mpsc::UnboundedSender<QueuedJob<T>>,
    state: watch::Receiver<QueueState>,
    pending: Arc<AtomicUsize>,
    next_id: AtomicU64,
    shutdown: CancellationToken,
}

impl<T: Send + 'static> RequestQueue<T> {
    pub fn new(config: QueueConfig) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(QueueState::Idle);
        let pending = Arc::new(AtomicUsize::new(0));
        let shutdown = CancellationToken::new();

        tokio::spawn(
            run_worker(
                jobs_rx,
                config,
                state_tx,
                Arc::clone(&pending),
                shutdown.clone(),
            )
            .in_current_span(),
        );

        Self {
            jobs: jobs_tx,
            state: state_rx,
            pending,
            next_id: AtomicU64::new(1),
            shutdown,
        }
    }

    /// Append a job to the tail of the queue.
    ///
    /// `job` is not called until every earlier job has settled and its
    /// cooldown has elapsed. Pushing while busy only enqueues.
    pub fn push<F, Fut>(&self, job: F) -> JobHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        let handle = JobHandle { id, rx: reply_rx };

        if self.shutdown.is_cancelled() {
            let _ = reply_tx.send(Err(QueueError::Closed));
            return handle;
        }

        let queued = QueuedJob {
            id,
            run: Box::new(move || job().boxed()),
            reply: reply_tx,
        };

        self.pending.fetch_add(1, Ordering::AcqRel);
        if let Err(mpsc::error::SendError(rejected)) = self.jobs.send(queued) {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            let _ = rejected.reply.send(Err(QueueError::Closed));
        }

        handle
    }

    /// Current worker state
    pub fn state(&self) -> QueueState {
        *self.state.borrow()
    }

    /// Watch channel following every state transition
    pub fn subscribe(&self) -> watch::Receiver<QueueState> {
        self.state.clone()
    }

    /// Jobs accepted but not yet started
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Stop the worker. Later pushes settle immediately with
    /// [`QueueError::Closed`].
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl<T> Drop for RequestQueue<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run_worker<T: Send + 'static>(
    mut jobs: mpsc::UnboundedReceiver<QueuedJob<T>>,
    config: QueueConfig,
    state: watch::Sender<QueueState>,
    pending: Arc<AtomicUsize>,
    shutdown: CancellationToken,
) {
    loop {
        let job = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = jobs.recv() => match next {
                Some(job) => job,
                None => break,
            },
        };
        pending.fetch_sub(1, Ordering::AcqRel);

        if job.reply.is_closed() {
            debug!(job_id = job.id, "Caller dropped job before it started, skipping");
            continue;
        }

        state.send_replace(QueueState::Busy);
        let started = Instant::now();
        let outcome = execute(job.run, config.job_timeout).await;
        match &outcome {
            Ok(_) => debug!(
                job_id = job.id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Queued job settled"
            ),
            Err(e) => warn!(job_id = job.id, error = %e, "Queued job did not complete"),
        }
        if job.reply.send(outcome).is_err() {
            debug!(job_id = job.id, "No listener for job result, discarding");
        }

        // Cooldown applies regardless of the job's outcome
        state.send_replace(QueueState::CoolingDown);
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(config.cooldown) => {}
        }
        state.send_replace(QueueState::Idle);
    }

    // Every job that made it into the channel is counted down exactly once,
    // here or above; a push whose send fails undoes its own increment.
    jobs.close();
    let mut abandoned = 0usize;
    while jobs.try_recv().is_ok() {
        pending.fetch_sub(1, Ordering::AcqRel);
        abandoned += 1;
    }
    state.send_replace(QueueState::Stopped);

    if abandoned > 0 {
        info!(abandoned, "Request queue stopped, abandoning queued jobs");
    } else {
        debug!("Request queue stopped");
    }
}

async fn execute<T>(run: BoxedJob<T>, timeout: Option<Duration>) -> Result<T, QueueError> {
    // Calling `run` inside the guarded future also catches panics raised
    // while constructing the job's future.
    let guarded = AssertUnwindSafe(async move { run().await }).catch_unwind();
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, guarded).await {
            Ok(result) => result,
            Err(_) => return Err(QueueError::TimedOut(limit)),
        },
        None => guarded.await,
    };
    result.map_err(|_| QueueError::JobPanicked)
}
