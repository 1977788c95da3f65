pub mod generation_error;
pub mod init_error;

pub use generation_error::{GENERIC_RETRY_MESSAGE, GenerationError, GenerationResult};
pub use init_error::{CandidateFailure, InitializationError};
