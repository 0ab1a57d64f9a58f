//! Error types for the persister module.

use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur while resolving a response into an artifact.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The response did not carry a usable image entry.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The image entry has no URL to download from.
    #[error("Image entry has no download URL")]
    MissingUrl,

    /// Failed to build the download client.
    #[error("Failed to build download client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Connection or transport failure while downloading.
    #[error("Failed to download {url}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The download endpoint answered with a non-success status.
    #[error("Download of {url} returned HTTP {status}")]
    DownloadStatus { url: String, status: u16 },

    /// Failed to create or write an output file.
    #[error("Failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the prompt record.
    #[error("Failed to serialize prompt record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PersistError {
    /// Creates an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether files may have been left on disk by the failed attempt.
    pub fn may_leave_partial_files(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Download { .. } | Self::Serialize(_))
    }
}
