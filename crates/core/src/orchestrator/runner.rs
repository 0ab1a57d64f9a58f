//! Run orchestrator implementation.
//!
//! Provisions the bucket once, then hands job indices to a fixed pool of
//! worker tasks through a shared queue. Each worker sends one outcome per
//! job back over a result channel; [`RunHandle::wait`] collects them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::api::{ImageApi, OpenAiImageClient};
use crate::config::Config;
use crate::job::{GenerationOptions, JobExecutor, RequestPolicy};
use crate::persister::AssetPersister;
use crate::storage::DirectoryProvisioner;

use super::config::RunnerConfig;
use super::types::{JobOutcome, OrchestratorError, RunReport};

/// Callback invoked as each job finishes, from the worker that ran it.
pub type JobOutcomeCallback = Arc<dyn Fn(&JobOutcome) + Send + Sync>;

/// Drives the jobs of a run.
pub struct Orchestrator {
    config: RunnerConfig,
    provisioner: DirectoryProvisioner,
    executor: Arc<JobExecutor>,
    outcome_callback: Option<JobOutcomeCallback>,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: RunnerConfig,
        provisioner: DirectoryProvisioner,
        executor: Arc<JobExecutor>,
    ) -> Self {
        Self {
            config,
            provisioner,
            executor,
            outcome_callback: None,
        }
    }

    /// Wires the OpenAI client, persister and provisioner from configuration.
    pub fn from_config(config: &Config) -> Result<Self, OrchestratorError> {
        let api: Arc<dyn ImageApi> = Arc::new(OpenAiImageClient::new(&config.api)?);
        let persister = Arc::new(AssetPersister::from_config(&config.api)?);
        let provisioner = DirectoryProvisioner::from_config(&config.output)?;
        let executor = JobExecutor::new(api, persister, RequestPolicy::from_config(&config.api));

        Ok(Self::new(config.runner.clone(), provisioner, Arc::new(executor)))
    }

    /// Set a callback to observe each job as it finishes.
    pub fn with_outcome_callback(mut self, callback: JobOutcomeCallback) -> Self {
        self.outcome_callback = Some(callback);
        self
    }

    pub fn provisioner(&self) -> &DirectoryProvisioner {
        &self.provisioner
    }

    /// Provisions the output directory and starts the run.
    ///
    /// Returns once the workers are spawned; only provisioning errors are
    /// reported here. Job outcomes come from [`RunHandle::wait`].
    pub async fn start(&self, options: GenerationOptions) -> Result<RunHandle, OrchestratorError> {
        let started = Instant::now();
        let output_dir = self.provisioner.provision(&options.bucket).await?;
        let requested = options.count;
        let workers = self.config.worker_count(requested);

        info!(
            "Starting run: {} job(s) into {} with {} worker(s)",
            requested,
            output_dir.display(),
            workers
        );

        let (queue_tx, queue_rx) = mpsc::unbounded_channel::<usize>();
        for index in 0..requested {
            // Receiver is alive until the workers below drop it
            let _ = queue_tx.send(index);
        }
        drop(queue_tx);

        let queue = Arc::new(Mutex::new(queue_rx));
        let (result_tx, result_rx) = mpsc::unbounded_channel::<JobOutcome>();
        let options = Arc::new(options);

        for worker_id in 0..workers {
            let queue = Arc::clone(&queue);
            let executor = Arc::clone(&self.executor);
            let options = Arc::clone(&options);
            let output_dir = output_dir.clone();
            let result_tx = result_tx.clone();
            let callback = self.outcome_callback.clone();

            tokio::spawn(async move {
                Self::worker_loop(
                    worker_id,
                    queue,
                    executor,
                    options,
                    output_dir,
                    result_tx,
                    callback,
                )
                .await;
            });
        }
        drop(result_tx);

        Ok(RunHandle {
            output_dir,
            requested,
            started,
            results: result_rx,
        })
    }

    /// Starts the run and waits for every job to finish.
    pub async fn run(&self, options: GenerationOptions) -> Result<RunReport, OrchestratorError> {
        Ok(self.start(options).await?.wait().await)
    }

    async fn worker_loop(
        worker_id: usize,
        queue: Arc<Mutex<mpsc::UnboundedReceiver<usize>>>,
        executor: Arc<JobExecutor>,
        options: Arc<GenerationOptions>,
        output_dir: PathBuf,
        result_tx: mpsc::UnboundedSender<JobOutcome>,
        callback: Option<JobOutcomeCallback>,
    ) {
        loop {
            let next = queue.lock().await.recv().await;
            let Some(index) = next else {
                break;
            };

            let outcome = async {
                debug!("Job started on worker {}", worker_id);
                let result = executor.run(&options, index, &output_dir).await;

                match &result {
                    Ok(artifact) => info!(
                        "Job finished: saved {} ({} bytes)",
                        artifact.image_path.display(),
                        artifact.image_bytes
                    ),
                    Err(e) => warn!("Job failed: {}", e),
                }

                JobOutcome { index, result }
            }
            .instrument(info_span!("job", index))
            .await;

            if let Some(ref cb) = callback {
                cb(&outcome);
            }

            if result_tx.send(outcome).is_err() {
                // Handle dropped; nobody is collecting outcomes any more
                debug!("Worker {} stopping: run handle dropped", worker_id);
                break;
            }
        }

        debug!("Worker {} finished", worker_id);
    }
}

/// Completion handle for a started run.
pub struct RunHandle {
    output_dir: PathBuf,
    requested: usize,
    started: Instant,
    results: mpsc::UnboundedReceiver<JobOutcome>,
}

impl RunHandle {
    /// Bucket directory the run writes into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Number of jobs in the run.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Waits until every job has finished and returns their outcomes.
    pub async fn wait(mut self) -> RunReport {
        let mut outcomes = BTreeMap::new();
        while let Some(outcome) = self.results.recv().await {
            outcomes.insert(outcome.index, outcome.result);
        }

        let report = RunReport {
            output_dir: self.output_dir,
            requested: self.requested,
            outcomes,
            duration_ms: self.started.elapsed().as_millis() as u64,
        };

        info!(
            "Run finished: {} succeeded, {} failed in {} ms",
            report.succeeded(),
            report.failed(),
            report.duration_ms
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ImageStyle;
    use crate::storage::ProvisionError;
    use crate::testing::MockImageApi;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn asset_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"img".to_vec()))
            .mount(&server)
            .await;
        server
    }

    fn orchestrator(
        root: &Path,
        api: Arc<MockImageApi>,
        max_concurrent_jobs: usize,
    ) -> Orchestrator {
        let persister = Arc::new(AssetPersister::new(Duration::from_secs(5)).unwrap());
        let executor = JobExecutor::new(api, persister, RequestPolicy::default());
        Orchestrator::new(
            RunnerConfig {
                max_concurrent_jobs,
            },
            DirectoryProvisioner::new(root),
            Arc::new(executor),
        )
    }

    #[tokio::test]
    async fn test_zero_jobs_still_provisions() {
        let temp = TempDir::new().unwrap();
        let api = Arc::new(MockImageApi::new("http://127.0.0.1:9"));
        let orch = orchestrator(temp.path(), Arc::clone(&api), 4);

        let report = orch
            .run(GenerationOptions::new("empty", 0, "p", ImageStyle::Vivid, "k"))
            .await
            .unwrap();

        assert_eq!(report.requested, 0);
        assert!(report.outcomes.is_empty());
        assert!(temp.path().join("empty").is_dir());
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provision_failure_is_returned_synchronously() {
        let temp = TempDir::new().unwrap();
        let api = Arc::new(MockImageApi::new("http://127.0.0.1:9"));
        let orch = orchestrator(temp.path(), Arc::clone(&api), 4);

        let result = orch
            .start(GenerationOptions::new("../escape", 3, "p", ImageStyle::Vivid, "k"))
            .await;

        assert!(matches!(
            result,
            Err(OrchestratorError::Provision(ProvisionError::InvalidBucket { .. }))
        ));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let server = asset_server().await;
        let temp = TempDir::new().unwrap();
        let api = Arc::new(MockImageApi::new(server.uri()));
        api.set_delay(Duration::from_millis(40)).await;
        let orch = orchestrator(temp.path(), Arc::clone(&api), 2);

        let report = orch
            .run(GenerationOptions::new("b", 6, "p", ImageStyle::Vivid, "k"))
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 6);
        assert!(api.max_in_flight() <= 2);
    }

    #[tokio::test]
    async fn test_callback_sees_every_job() {
        let server = asset_server().await;
        let temp = TempDir::new().unwrap();
        let api = Arc::new(MockImageApi::new(server.uri()));
        api.fail_call(1, crate::api::ApiError::EmptyData).await;

        let seen = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let (seen_cb, failed_cb) = (Arc::clone(&seen), Arc::clone(&failed));

        let orch = orchestrator(temp.path(), api, 1).with_outcome_callback(Arc::new(
            move |outcome: &JobOutcome| {
                seen_cb.fetch_add(1, Ordering::SeqCst);
                if !outcome.is_success() {
                    failed_cb.fetch_add(1, Ordering::SeqCst);
                }
            },
        ));

        let report = orch
            .run(GenerationOptions::new("b", 3, "p", ImageStyle::Vivid, "k"))
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(failed.load(Ordering::SeqCst), 1);
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn test_start_returns_before_jobs_finish() {
        let server = asset_server().await;
        let temp = TempDir::new().unwrap();
        let api = Arc::new(MockImageApi::new(server.uri()));
        api.set_delay(Duration::from_millis(100)).await;
        let orch = orchestrator(temp.path(), Arc::clone(&api), 4);

        let handle = orch
            .start(GenerationOptions::new("b", 2, "p", ImageStyle::Vivid, "k"))
            .await
            .unwrap();

        assert_eq!(handle.requested(), 2);
        assert_eq!(handle.output_dir(), temp.path().join("b"));

        let report = handle.wait().await;
        assert_eq!(report.succeeded(), 2);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_job_logs_carry_index_span() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let server = asset_server().await;
        let temp = TempDir::new().unwrap();
        let api = Arc::new(MockImageApi::new(server.uri()));
        api.fail_call(1, crate::api::ApiError::EmptyData).await;
        let orch = orchestrator(temp.path(), api, 1);

        orch.run(GenerationOptions::new("b", 2, "p", ImageStyle::Vivid, "k"))
            .await
            .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let finished = output
            .lines()
            .find(|l| l.contains("Job finished"))
            .expect("finish line logged");
        assert!(finished.contains("job{index=0}"));
        let failed = output
            .lines()
            .find(|l| l.contains("Job failed"))
            .expect("failure line logged");
        assert!(failed.contains("job{index=1}"));
    }
}
