//! Run orchestrator.
//!
//! A run provisions its bucket directory once, then drives N independent
//! jobs through a bounded worker pool:
//! - **Queue**: job indices `0..N`, consumed by a fixed set of workers
//! - **Workers**: `min(max_concurrent_jobs, N)` tasks, one job at a time each
//! - **Results**: one outcome per job, collected into a [`RunReport`]
//!
//! A failing job never affects its siblings.

mod config;
mod runner;
mod types;

pub use config::RunnerConfig;
pub use runner::{JobOutcomeCallback, Orchestrator, RunHandle};
pub use types::{JobOutcome, OrchestratorError, RunReport};
