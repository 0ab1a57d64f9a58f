use std::fmt;

use crate::api::{GenerationRequest, ImageQuality, ImageSize, ImageStyle, ResponseFormat};
use crate::config::ApiConfig;

/// Inputs shared by every job of a run. Read-only once the run starts.
#[derive(Clone)]
pub struct GenerationOptions {
    /// Bucket the artifacts are stored under.
    pub bucket: String,
    /// Number of jobs to run.
    pub count: usize,
    pub prompt: String,
    pub style: ImageStyle,
    /// Bearer credential for the API.
    pub credential: String,
}

impl GenerationOptions {
    pub fn new(
        bucket: impl Into<String>,
        count: usize,
        prompt: impl Into<String>,
        style: ImageStyle,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            count,
            prompt: prompt.into(),
            style,
            credential: credential.into(),
        }
    }
}

// Hand-written so the credential never reaches logs.
impl fmt::Debug for GenerationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationOptions")
            .field("bucket", &self.bucket)
            .field("count", &self.count)
            .field("prompt", &self.prompt)
            .field("style", &self.style)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Request values that are fixed for every job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPolicy {
    pub model: String,
    pub quality: ImageQuality,
    pub response_format: ResponseFormat,
    pub size: ImageSize,
    /// Opaque end-user tag.
    pub user: String,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            model: "dall-e-3".to_string(),
            quality: ImageQuality::Standard,
            response_format: ResponseFormat::Url,
            size: ImageSize::Square1024,
            user: os_user_tag(),
        }
    }
}

impl RequestPolicy {
    /// Builds the policy from configuration, tagging requests with the OS
    /// user unless a tag is configured.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            model: config.model.clone(),
            quality: config.quality,
            response_format: config.response_format,
            size: config.size,
            user: config.user.clone().unwrap_or_else(os_user_tag),
        }
    }

    /// Builds the request for one job. Always asks for a single image.
    pub fn build_request(&self, options: &GenerationOptions) -> GenerationRequest {
        GenerationRequest {
            n: 1,
            model: self.model.clone(),
            prompt: options.prompt.clone(),
            quality: self.quality,
            response_format: self.response_format,
            size: self.size,
            style: options.style,
            user: self.user.clone(),
        }
    }
}

/// Name of the user running the process, or `"unknown"`.
pub fn os_user_tag() -> String {
    ["USER", "LOGNAME", "USERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}
