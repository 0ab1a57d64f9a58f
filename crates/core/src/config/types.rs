use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::api::{ImageQuality, ImageSize, ResponseFormat};
use crate::orchestrator::RunnerConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Image generation API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// API base URL; the generation endpoint is `<base_url>/images/generations`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key. Usually left unset and supplied via `OPENAI_APIKEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub quality: ImageQuality,
    #[serde(default)]
    pub size: ImageSize,
    #[serde(default)]
    pub response_format: ResponseFormat,
    /// Request timeout in seconds, applied to both the API call and the download.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Opaque user tag sent with every request (default: the OS user name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            quality: ImageQuality::default(),
            size: ImageSize::default(),
            response_format: ResponseFormat::default(),
            timeout_secs: default_timeout(),
            user: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "dall-e-3".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Output location configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory that holds the buckets (default: `<home>/aimakeme`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: SanitizedApiConfig,
    pub output: OutputConfig,
    pub runner: RunnerConfig,
}

/// Sanitized API config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedApiConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub model: String,
    pub quality: ImageQuality,
    pub size: ImageSize,
    pub response_format: ResponseFormat,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            api: SanitizedApiConfig {
                base_url: config.api.base_url.clone(),
                api_key_configured: config.api.api_key.as_ref().is_some_and(|k| !k.is_empty()),
                model: config.api.model.clone(),
                quality: config.api.quality,
                size: config.api.size,
                response_format: config.api.response_format,
                timeout_secs: config.api.timeout_secs,
                user: config.api.user.clone(),
            },
            output: config.output.clone(),
            runner: config.runner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, "https://api.openai.com/v1");
        assert_eq!(config.api.model, "dall-e-3");
        assert_eq!(config.api.quality, ImageQuality::Standard);
        assert_eq!(config.api.size, ImageSize::Square1024);
        assert_eq!(config.api.response_format, ResponseFormat::Url);
        assert_eq!(config.api.timeout_secs, 120);
        assert!(config.api.api_key.is_none());
        assert!(config.output.root.is_none());
        assert_eq!(config.runner.max_concurrent_jobs, 4);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[api]
base_url = "http://localhost:9999/v1"
model = "dall-e-2"
quality = "hd"
size = "1792x1024"
timeout_secs = 10
user = "tester"

[output]
root = "/data/images"

[runner]
max_concurrent_jobs = 2
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9999/v1");
        assert_eq!(config.api.model, "dall-e-2");
        assert_eq!(config.api.quality, ImageQuality::Hd);
        assert_eq!(config.api.size, ImageSize::Landscape1792);
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.api.user.as_deref(), Some("tester"));
        assert_eq!(
            config.output.root.as_deref(),
            Some(std::path::Path::new("/data/images"))
        );
        assert_eq!(config.runner.max_concurrent_jobs, 2);
    }

    #[test]
    fn test_deserialize_unknown_quality_fails() {
        let toml = r#"
[api]
quality = "ultra"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let mut config = Config::default();
        config.api.api_key = Some("sk-secret".to_string());

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.api.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn test_sanitized_config_empty_key_not_configured() {
        let mut config = Config::default();
        config.api.api_key = Some(String::new());

        let sanitized = SanitizedConfig::from(&config);
        assert!(!sanitized.api.api_key_configured);
    }
}
