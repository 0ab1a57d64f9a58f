//! Single-job execution.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::error::JobError;
use super::types::{GenerationOptions, RequestPolicy};
use crate::api::{GenerationRequest, ImageApi};
use crate::persister::{Artifact, AssetPersister};

/// Runs a single job: one generation call followed by one resolve.
///
/// No retries; the first error ends the job.
pub struct JobExecutor {
    api: Arc<dyn ImageApi>,
    persister: Arc<AssetPersister>,
    policy: RequestPolicy,
}

impl JobExecutor {
    pub fn new(
        api: Arc<dyn ImageApi>,
        persister: Arc<AssetPersister>,
        policy: RequestPolicy,
    ) -> Self {
        Self {
            api,
            persister,
            policy,
        }
    }

    /// Builds the request a job would send.
    pub fn build_request(&self, options: &GenerationOptions) -> GenerationRequest {
        self.policy.build_request(options)
    }

    /// Runs job `index`, writing its artifact into `output_dir`.
    ///
    /// `output_dir` must already exist.
    pub async fn run(
        &self,
        options: &GenerationOptions,
        index: usize,
        output_dir: &Path,
    ) -> Result<Artifact, JobError> {
        let request = self.build_request(options);

        debug!("Job {}: requesting image from {}", index, self.api.name());
        let response = self.api.generate(&request, &options.credential).await?;

        let artifact = self
            .persister
            .resolve(response, options, index, output_dir)
            .await?;

        Ok(artifact)
    }
}
