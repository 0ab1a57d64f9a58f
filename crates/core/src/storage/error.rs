//! Error types for the storage module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while provisioning an output directory.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The user's home directory could not be resolved.
    #[error("Could not resolve the home directory")]
    HomeDirUnavailable,

    /// The bucket name cannot be used as a directory below the root.
    #[error("Invalid bucket name: {bucket:?}")]
    InvalidBucket { bucket: String },

    /// The target path exists but is not a directory.
    #[error("Output path exists and is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Failed to create the directory tree.
    #[error("Failed to create directory: {path}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
