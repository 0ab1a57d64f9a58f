//! Mock image generation API for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::api::{ApiError, GenerationRequest, GenerationResponse, ImageApi, ImageData};

/// A recorded generation call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedGeneration {
    /// Zero-based call number.
    pub call: usize,
    pub request: GenerationRequest,
    pub credential: String,
}

/// Scripted reply for a single call.
#[derive(Debug)]
enum ScriptedReply {
    Fail(ApiError),
    Respond(GenerationResponse),
}

/// Mock implementation of the ImageApi trait.
///
/// By default call `k` succeeds with one entry whose url is
/// `{asset_base_url}/{k}.png` and whose revised prompt is
/// `"{prompt} (revised #{k})"`. Individual calls can be scripted to fail
/// or to return a specific response.
///
/// # Example
///
/// ```rust,ignore
/// use aimakeme_core::testing::MockImageApi;
///
/// let api = MockImageApi::new(asset_server.uri());
/// api.fail_call(1, ApiError::EmptyData).await;
///
/// // Second call fails, the others point at the asset server
/// ```
#[derive(Debug)]
pub struct MockImageApi {
    asset_base_url: String,
    /// Recorded calls in arrival order.
    requests: Arc<RwLock<Vec<RecordedGeneration>>>,
    /// Replies scripted by call number.
    scripted: Arc<RwLock<HashMap<usize, ScriptedReply>>>,
    /// Artificial latency per call.
    delay: Arc<RwLock<Option<Duration>>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockImageApi {
    /// Create a mock whose default urls point under `asset_base_url`.
    pub fn new(asset_base_url: impl Into<String>) -> Self {
        Self {
            asset_base_url: asset_base_url.into().trim_end_matches('/').to_string(),
            requests: Arc::new(RwLock::new(Vec::new())),
            scripted: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(None)),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Make call `call` fail with `error`.
    pub async fn fail_call(&self, call: usize, error: ApiError) {
        self.scripted
            .write()
            .await
            .insert(call, ScriptedReply::Fail(error));
    }

    /// Make call `call` return `response` verbatim.
    pub async fn respond_on_call(&self, call: usize, response: GenerationResponse) {
        self.scripted
            .write()
            .await
            .insert(call, ScriptedReply::Respond(response));
    }

    /// Make call `call` return a response with no data and no error.
    pub async fn respond_empty_on_call(&self, call: usize) {
        self.respond_on_call(
            call,
            GenerationResponse {
                created: 1_700_000_000,
                ..Default::default()
            },
        )
        .await;
    }

    /// Hold every call for `delay` before answering.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// All calls made so far.
    pub async fn recorded_requests(&self) -> Vec<RecordedGeneration> {
        self.requests.read().await.clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Url the default reply uses for call `call`.
    pub fn asset_url(&self, call: usize) -> String {
        format!("{}/{}.png", self.asset_base_url, call)
    }

    fn default_response(&self, call: usize, request: &GenerationRequest) -> GenerationResponse {
        GenerationResponse {
            created: 1_700_000_000 + call as i64,
            data: vec![ImageData {
                revised_prompt: format!("{} (revised #{})", request.prompt, call),
                url: Some(self.asset_url(call)),
                b64_json: None,
            }],
            error: None,
        }
    }
}

#[async_trait]
impl ImageApi for MockImageApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        credential: &str,
    ) -> Result<GenerationResponse, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.requests.write().await.push(RecordedGeneration {
            call,
            request: request.clone(),
            credential: credential.to_string(),
        });

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.scripted.write().await.remove(&call);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match scripted {
            Some(ScriptedReply::Fail(error)) => Err(error),
            Some(ScriptedReply::Respond(response)) => Ok(response),
            None => Ok(self.default_response(call, request)),
        }
    }
}
