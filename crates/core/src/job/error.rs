//! Error types for job execution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiError;
use crate::persister::PersistError;

/// Coarse classification of a failure, independent of where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Environment or configuration problem (e.g. no home directory).
    Config,
    /// Directory or file creation/write failure.
    Io,
    /// Connection or transport failure.
    Network,
    /// The API reported an error or returned no data.
    Api,
    /// The API reply could not be decoded.
    Decode,
}

/// Terminal error of a single job.
#[derive(Debug, Error)]
pub enum JobError {
    /// The generation call failed.
    #[error("generation failed: {0}")]
    Generate(#[from] ApiError),

    /// Resolving the response into an artifact failed.
    #[error("persisting failed: {0}")]
    Persist(#[from] PersistError),
}

impl JobError {
    /// Maps the error onto the failure taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Generate(e) => api_category(e),
            Self::Persist(e) => persist_category(e),
        }
    }
}

fn api_category(error: &ApiError) -> ErrorCategory {
    match error {
        ApiError::Network(_) => ErrorCategory::Network,
        ApiError::Decode(_) => ErrorCategory::Decode,
        ApiError::Api { .. } | ApiError::EmptyData => ErrorCategory::Api,
        ApiError::Encode(_) | ApiError::NotConfigured(_) => ErrorCategory::Config,
    }
}

fn persist_category(error: &PersistError) -> ErrorCategory {
    match error {
        PersistError::Api(e) => api_category(e),
        PersistError::MissingUrl => ErrorCategory::Api,
        PersistError::ClientBuild(_)
        | PersistError::Download { .. }
        | PersistError::DownloadStatus { .. } => ErrorCategory::Network,
        PersistError::Io { .. } | PersistError::Serialize(_) => ErrorCategory::Io,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_categories() {
        assert_eq!(
            JobError::from(ApiError::EmptyData).category(),
            ErrorCategory::Api
        );
        assert_eq!(
            JobError::from(ApiError::Decode("bad".to_string())).category(),
            ErrorCategory::Decode
        );
        let encode = serde_json::from_str::<u8>("x").unwrap_err();
        assert_eq!(
            JobError::from(ApiError::Encode(encode)).category(),
            ErrorCategory::Config
        );
        assert_eq!(
            JobError::from(PersistError::Api(ApiError::EmptyData)).category(),
            ErrorCategory::Api
        );
        assert_eq!(
            JobError::from(PersistError::DownloadStatus {
                url: "https://img.example/x".to_string(),
                status: 404,
            })
            .category(),
            ErrorCategory::Network
        );
        assert_eq!(
            JobError::from(PersistError::io(
                PathBuf::from("/x.jpg"),
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ))
            .category(),
            ErrorCategory::Io
        );
    }

    #[test]
    fn test_error_display() {
        let err = JobError::from(ApiError::EmptyData);
        assert_eq!(
            err.to_string(),
            "generation failed: API response contained no image data"
        );

        let err = JobError::from(PersistError::MissingUrl);
        assert_eq!(
            err.to_string(),
            "persisting failed: Image entry has no download URL"
        );
    }
}
