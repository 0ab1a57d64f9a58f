//! Downloads generated images and writes artifact pairs.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use super::error::PersistError;
use super::types::{Artifact, PromptRecord};
use crate::api::GenerationResponse;
use crate::config::ApiConfig;
use crate::job::GenerationOptions;

/// Extension of the downloaded image file.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Extension of the prompt record file.
pub const PROMPT_EXTENSION: &str = "prompt";

/// Write buffer for streamed downloads.
const WRITE_BUFFER_SIZE: usize = 256 * 1024;

/// Builds the shared file stem for a job: `<YYYY><M><D><h><m><s>_<index>`.
///
/// Components are plain decimals without padding, so two different instants
/// can render the same stem; the index keeps stems unique within a run.
pub fn root_name<Tz: TimeZone>(now: &DateTime<Tz>, index: usize) -> String {
    format!(
        "{}{}{}{}{}{}_{}",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        index
    )
}

/// Resolves generation responses into artifacts on disk.
pub struct AssetPersister {
    client: Client,
}

impl AssetPersister {
    /// Creates a persister whose downloads time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, PersistError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PersistError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Creates a persister using the API timeout.
    pub fn from_config(config: &ApiConfig) -> Result<Self, PersistError> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }

    /// Downloads the first image of `response` and writes the artifact pair.
    ///
    /// `output_dir` must already exist. Nothing is written if the response
    /// carries no usable entry or the download cannot be started.
    pub async fn resolve(
        &self,
        response: GenerationResponse,
        options: &GenerationOptions,
        index: usize,
        output_dir: &Path,
    ) -> Result<Artifact, PersistError> {
        let entry = response.into_first_entry()?;
        let url = entry.url.ok_or(PersistError::MissingUrl)?;

        debug!("Job {}: downloading {}", index, url);

        let download = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PersistError::Download {
                url: url.clone(),
                source: e,
            })?;

        let status = download.status();
        if !status.is_success() {
            return Err(PersistError::DownloadStatus {
                url,
                status: status.as_u16(),
            });
        }

        let root = root_name(&Local::now(), index);
        let image_path = output_dir.join(format!("{}.{}", root, IMAGE_EXTENSION));
        let prompt_path = output_dir.join(format!("{}.{}", root, PROMPT_EXTENSION));

        let file = create_new(&image_path).await?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let mut hasher = Sha256::new();
        let mut image_bytes = 0u64;

        let mut body = download.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| PersistError::Download {
                url: url.clone(),
                source: e,
            })?;
            hasher.update(&chunk);
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| PersistError::io(&image_path, e))?;
            image_bytes += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .map_err(|e| PersistError::io(&image_path, e))?;

        let record = PromptRecord {
            prompt: options.prompt.clone(),
            revised_prompt: entry.revised_prompt,
        };
        let payload = serde_json::to_vec(&record)?;

        let mut prompt_file = create_new(&prompt_path).await?;
        prompt_file
            .write_all(&payload)
            .await
            .map_err(|e| PersistError::io(&prompt_path, e))?;
        prompt_file
            .flush()
            .await
            .map_err(|e| PersistError::io(&prompt_path, e))?;

        debug!(
            "Job {}: wrote {} ({} bytes)",
            index,
            image_path.display(),
            image_bytes
        );

        Ok(Artifact {
            index,
            root_name: root,
            image_path,
            prompt_path,
            image_bytes,
            sha256: format!("{:x}", hasher.finalize()),
        })
    }
}

/// Creates a file that must not exist yet; artifacts are never overwritten.
async fn create_new(path: &Path) -> Result<File, PersistError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| PersistError::io(path, e))
}
