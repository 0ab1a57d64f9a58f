use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aimakeme_core::{
    load_config_layered, validate_config, Config, GenerationOptions, ImageStyle, JobError,
    JobOutcome, Orchestrator, RunReport, SanitizedConfig,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the API credential.
const CREDENTIAL_ENV: &str = "OPENAI_APIKEY";

/// Generate a batch of images from one prompt.
#[derive(Debug, Parser)]
#[command(name = "aimakeme", version, about)]
struct Args {
    /// Bucket folder the images are saved under
    #[arg(short, long, default_value = "default")]
    folder: String,

    /// Number of images to generate
    #[arg(short, long, default_value_t = 1)]
    number: usize,

    /// Prompt sent with every request
    #[arg(short, long, default_value = "An image that makes you happy")]
    prompt: String,

    /// Image style: vivid or natural
    #[arg(short, long, default_value = "vivid")]
    style: ImageStyle,

    /// Optional TOML configuration file
    #[arg(short, long, env = "AIMAKEME_CONFIG", default_value = "aimakeme.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("aimakeme v{}", VERSION);

    // Load configuration
    let config = load_config_layered(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    info!("Configuration: {}", sanitized);

    let credential = resolve_credential(&config, std::env::var(CREDENTIAL_ENV).ok())?;

    let orchestrator = Orchestrator::from_config(&config)
        .context("Failed to set up generation")?
        .with_outcome_callback(Arc::new(|outcome: &JobOutcome| {
            if let Err(e) = &outcome.result {
                warn!("Image {} failed [{:?}]: {}", outcome.index, e.category(), e);
                if matches!(e, JobError::Persist(p) if p.may_leave_partial_files()) {
                    warn!("Image {} may have left a partial file behind", outcome.index);
                }
            }
        }));

    info!(
        "Saving under {}",
        orchestrator.provisioner().root().display()
    );

    let options = GenerationOptions::new(
        args.folder,
        args.number,
        args.prompt,
        args.style,
        credential,
    );

    let report = orchestrator
        .run(options)
        .await
        .context("Failed to start run")?;

    log_summary(&report);

    // Failed jobs are reported above; they do not change the exit status.
    Ok(())
}

/// Picks the credential: configured key first, then the environment.
fn resolve_credential(config: &Config, from_env: Option<String>) -> Result<String> {
    let credential = config
        .api
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| from_env.filter(|k| !k.trim().is_empty()));

    match credential {
        Some(credential) => Ok(credential),
        None => bail!("No API key: set {} or api.api_key", CREDENTIAL_ENV),
    }
}

fn log_summary(report: &RunReport) {
    for artifact in report.artifacts() {
        info!(
            "Saved {} (sha256 {})",
            artifact.image_path.display(),
            artifact.sha256
        );
    }

    info!(
        "{} of {} image(s) saved to {} in {} ms",
        report.succeeded(),
        report.requested,
        report.output_dir.display(),
        report.duration_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["aimakeme"]).unwrap();
        assert_eq!(args.folder, "default");
        assert_eq!(args.number, 1);
        assert_eq!(args.prompt, "An image that makes you happy");
        assert_eq!(args.style, ImageStyle::Vivid);
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "aimakeme",
            "-f",
            "cats",
            "-n",
            "3",
            "-p",
            "a cat",
            "-s",
            "natural",
            "-c",
            "custom.toml",
        ])
        .unwrap();
        assert_eq!(args.folder, "cats");
        assert_eq!(args.number, 3);
        assert_eq!(args.prompt, "a cat");
        assert_eq!(args.style, ImageStyle::Natural);
        assert_eq!(args.config, PathBuf::from("custom.toml"));
    }

    #[test]
    fn test_unknown_style_rejected() {
        assert!(Args::try_parse_from(["aimakeme", "--style", "sepia"]).is_err());
    }

    #[test]
    fn test_credential_prefers_config() {
        let mut config = Config::default();
        config.api.api_key = Some("sk-config".to_string());
        let credential = resolve_credential(&config, Some("sk-env".to_string())).unwrap();
        assert_eq!(credential, "sk-config");
    }

    #[test]
    fn test_credential_falls_back_to_env() {
        let config = Config::default();
        let credential = resolve_credential(&config, Some("sk-env".to_string())).unwrap();
        assert_eq!(credential, "sk-env");
    }

    #[test]
    fn test_missing_or_blank_credential_is_error() {
        let config = Config::default();
        assert!(resolve_credential(&config, None).is_err());
        assert!(resolve_credential(&config, Some("  ".to_string())).is_err());
    }
}
