use super::{types::Config, ConfigError};
use crate::api::ResponseFormat;

/// Validate configuration
/// Currently validates:
/// - API base URL is not empty
/// - API timeout is not 0
/// - Response format is `url` (assets are downloaded by URL)
/// - Runner concurrency is at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.base_url cannot be empty".to_string(),
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.api.response_format != ResponseFormat::Url {
        return Err(ConfigError::ValidationError(
            "api.response_format must be \"url\"".to_string(),
        ));
    }

    if config.runner.max_concurrent_jobs == 0 {
        return Err(ConfigError::ValidationError(
            "runner.max_concurrent_jobs must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = Config::default();
        config.runner.max_concurrent_jobs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_base_url_fails() {
        let mut config = Config::default();
        config.api.base_url = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_b64_response_format_fails() {
        let mut config = Config::default();
        config.api.response_format = ResponseFormat::B64Json;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("response_format"));
    }
}
