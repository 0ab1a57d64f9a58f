//! Image generation API client.
//!
//! This module provides the `ImageApi` trait and the OpenAI implementation.
//! A call is a single POST; the reply is decoded whatever the HTTP status,
//! and callers decide success from its content via
//! [`GenerationResponse::into_first_entry`].

mod openai;
mod types;

pub use openai::OpenAiImageClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the generation API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection or transport failure.
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The request could not be serialized.
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    /// Body was not a valid generation response.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The API answered with an error descriptor.
    #[error("API error ({}): {message}", .kind.as_deref().unwrap_or("unknown"))]
    Api {
        code: Option<String>,
        message: String,
        param: Option<String>,
        kind: Option<String>,
    },

    /// The API answered with neither data nor an error.
    #[error("API response contained no image data")]
    EmptyData,

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// A backend that turns a generation request into a response.
#[async_trait]
pub trait ImageApi: Send + Sync {
    /// Returns the name of this backend.
    fn name(&self) -> &str;

    /// Performs one generation call. Never retries.
    async fn generate(
        &self,
        request: &GenerationRequest,
        credential: &str,
    ) -> Result<GenerationResponse, ApiError>;
}
