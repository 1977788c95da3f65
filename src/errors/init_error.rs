use std::fmt;
use thiserror::Error;

/// A candidate model whose liveness probe failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    pub model: String,
    pub reason: String,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.model, self.reason)
    }
}

/// No candidate model could be verified at startup.
///
/// Generation is unusable until the process is restarted with a working
/// configuration. The server itself keeps running.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("No candidate models configured")]
    NoCandidates,

    #[error("No model could be initialized; tried: {}", format_attempts(.attempts))]
    AllCandidatesFailed { attempts: Vec<CandidateFailure> },
}

fn format_attempts(attempts: &[CandidateFailure]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
