//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the job runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Maximum number of jobs in flight at once (must be at least 1).
    /// Fewer workers are started when the run has fewer jobs.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

fn default_max_concurrent_jobs() -> usize {
    4
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

impl RunnerConfig {
    /// Number of workers to start for a run of `jobs` jobs.
    pub fn worker_count(&self, jobs: usize) -> usize {
        self.max_concurrent_jobs.max(1).min(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.max_concurrent_jobs, 4);
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: RunnerConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_concurrent_jobs, 4);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            max_concurrent_jobs = 16
        "#;
        let config: RunnerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_concurrent_jobs, 16);
    }

    #[test]
    fn test_worker_count() {
        let config = RunnerConfig {
            max_concurrent_jobs: 4,
        };
        assert_eq!(config.worker_count(0), 0);
        assert_eq!(config.worker_count(2), 2);
        assert_eq!(config.worker_count(100), 4);

        let zero = RunnerConfig {
            max_concurrent_jobs: 0,
        };
        assert_eq!(zero.worker_count(3), 1);
    }
}
