//! Types for the persister module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metadata written next to every image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    /// Prompt as supplied by the user.
    pub prompt: String,
    /// Prompt as rewritten by the model.
    pub revised_prompt: String,
}

/// The durable output of one successful job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Job index within the run.
    pub index: usize,
    /// Shared file stem, `<timestamp>_<index>`.
    pub root_name: String,
    /// Path of the downloaded image.
    pub image_path: PathBuf,
    /// Path of the prompt record.
    pub prompt_path: PathBuf,
    /// Size of the image in bytes.
    pub image_bytes: u64,
    /// SHA-256 of the image, hex encoded.
    pub sha256: String,
}
