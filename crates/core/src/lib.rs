pub mod api;
pub mod config;
pub mod job;
pub mod orchestrator;
pub mod persister;
pub mod storage;
pub mod testing;

pub use api::{
    ApiError, GenerationRequest, GenerationResponse, ImageApi, ImageQuality, ImageSize,
    ImageStyle, OpenAiImageClient, ResponseFormat,
};
pub use config::{
    load_config, load_config_from_str, load_config_layered, validate_config, ApiConfig, Config,
    ConfigError, OutputConfig, SanitizedConfig,
};
pub use job::{ErrorCategory, GenerationOptions, JobError, JobExecutor, RequestPolicy};
pub use orchestrator::{
    JobOutcome, JobOutcomeCallback, Orchestrator, OrchestratorError, RunHandle, RunReport,
    RunnerConfig,
};
pub use persister::{Artifact, AssetPersister, PersistError, PromptRecord};
pub use storage::{DirectoryProvisioner, ProvisionError, APP_NAMESPACE};
