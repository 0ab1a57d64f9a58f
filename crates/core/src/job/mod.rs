//! Per-job pipeline: build one request, call the API, persist the result.

mod error;
mod executor;
mod types;

pub use error::{ErrorCategory, JobError};
pub use executor::JobExecutor;
pub use types::{os_user_tag, GenerationOptions, RequestPolicy};
