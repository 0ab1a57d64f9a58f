//! OpenAI images API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use super::types::{GenerationRequest, GenerationResponse};
use super::{ApiError, ImageApi};
use crate::config::ApiConfig;

/// OpenAI images API client.
pub struct OpenAiImageClient {
    client: Client,
    endpoint: String,
}

impl OpenAiImageClient {
    /// Create a new client from the API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::NotConfigured(
                "API base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/images/generations",
                config.base_url.trim_end_matches('/')
            ),
        })
    }

    /// The generation endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageApi for OpenAiImageClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        credential: &str,
    ) -> Result<GenerationResponse, ApiError> {
        let body = serde_json::to_vec(request)?;

        debug!(
            "POST {} model={} size={} style={}",
            self.endpoint,
            request.model,
            request.size.as_str(),
            request.style
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", credential))
            .body(body)
            .send()
            .await?;

        // Status is not interpreted here; error replies carry a descriptor.
        let status = response.status();
        let text = response.text().await?;

        debug!(
            "Generation endpoint answered {} ({} bytes)",
            status,
            text.len()
        );

        serde_json::from_str(&text).map_err(|e| {
            ApiError::Decode(format!(
                "Failed to parse generation response (HTTP {}): {}",
                status.as_u16(),
                e
            ))
        })
    }
}
