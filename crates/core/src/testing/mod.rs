//! Testing utilities and mock implementations.
//!
//! This module provides a scripted [`ImageApi`](crate::api::ImageApi) and
//! fixtures for building runs without talking to the real API.
//!
//! # Example
//!
//! ```rust,ignore
//! use aimakeme_core::testing::{fixtures, MockImageApi};
//!
//! let api = Arc::new(MockImageApi::new(asset_server.uri()));
//! api.respond_empty_on_call(0).await;
//!
//! let orchestrator = fixtures::orchestrator(temp.path(), api, 2);
//! let report = orchestrator.run(fixtures::options("bucket", 3)).await?;
//! ```

mod mock_image_api;

pub use mock_image_api::{MockImageApi, RecordedGeneration};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::net::{SocketAddr, TcpListener};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::api::{ApiErrorBody, GenerationResponse, ImageApi, ImageStyle};
    use crate::job::{GenerationOptions, JobExecutor, RequestPolicy};
    use crate::orchestrator::{Orchestrator, RunnerConfig};
    use crate::persister::AssetPersister;
    use crate::storage::DirectoryProvisioner;

    /// Credential used by fixtures.
    pub const TEST_CREDENTIAL: &str = "sk-test";

    /// An address nothing listens on: bound to a free port, then released.
    pub fn dead_address() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        listener.local_addr().expect("listener has an address")
    }

    /// Options for a vivid run of `count` jobs.
    pub fn options(bucket: &str, count: usize) -> GenerationOptions {
        GenerationOptions::new(
            bucket,
            count,
            "An image that makes you happy",
            ImageStyle::Vivid,
            TEST_CREDENTIAL,
        )
    }

    /// Request policy with a stable user tag.
    pub fn policy() -> RequestPolicy {
        RequestPolicy {
            user: "tester".to_string(),
            ..Default::default()
        }
    }

    /// Orchestrator writing under `root` through `api`.
    pub fn orchestrator(
        root: &Path,
        api: Arc<dyn ImageApi>,
        max_concurrent_jobs: usize,
    ) -> Orchestrator {
        let persister = Arc::new(
            AssetPersister::new(Duration::from_secs(5)).expect("persister client builds"),
        );
        let executor = JobExecutor::new(api, persister, policy());
        Orchestrator::new(
            RunnerConfig {
                max_concurrent_jobs,
            },
            DirectoryProvisioner::new(root),
            Arc::new(executor),
        )
    }

    /// A response carrying only an error descriptor.
    pub fn error_response(kind: &str, message: &str) -> GenerationResponse {
        GenerationResponse {
            created: 0,
            data: Vec::new(),
            error: Some(ApiErrorBody {
                code: None,
                message: message.to_string(),
                param: None,
                kind: Some(kind.to_string()),
            }),
        }
    }
}
