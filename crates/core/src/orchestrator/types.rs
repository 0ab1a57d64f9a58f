//! Types for the run orchestrator.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;
use crate::job::JobError;
use crate::persister::{Artifact, PersistError};
use crate::storage::ProvisionError;

/// Errors that stop a run before any job starts.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The output directory could not be provisioned.
    #[error("failed to provision output directory: {0}")]
    Provision(#[from] ProvisionError),

    /// The API client could not be built.
    #[error("failed to create API client: {0}")]
    ApiClient(#[from] ApiError),

    /// The persister could not be built.
    #[error("failed to create persister: {0}")]
    Persister(#[from] PersistError),
}

/// Final result of one job.
#[derive(Debug)]
pub struct JobOutcome {
    /// Job index within the run.
    pub index: usize,
    pub result: Result<Artifact, JobError>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-job outcomes of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Bucket directory the artifacts were written to.
    pub output_dir: PathBuf,
    /// Number of jobs requested.
    pub requested: usize,
    /// Outcome of every job, keyed by job index.
    pub outcomes: BTreeMap<usize, Result<Artifact, JobError>>,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
}

impl RunReport {
    /// Number of jobs that produced an artifact.
    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|r| r.is_ok()).count()
    }

    /// Number of jobs that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.values().filter(|r| r.is_err()).count()
    }

    /// Artifacts in job-index order.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.outcomes.values().filter_map(|r| r.as_ref().ok())
    }

    /// Failed jobs in job-index order.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &JobError)> {
        self.outcomes
            .iter()
            .filter_map(|(index, r)| r.as_ref().err().map(|e| (*index, e)))
    }

    /// Whether every requested job reported and succeeded.
    pub fn is_complete_success(&self) -> bool {
        self.outcomes.len() == self.requested && self.failed() == 0
    }
}
