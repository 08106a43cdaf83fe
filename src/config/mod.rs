//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `EVENTGRID_SINK` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use eventgrid_sink::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Publishing to {}", config.sink.endpoint);
//! ```

mod error;
mod logging;
mod sink;

pub use error::{ConfigError, ValidationError};
pub use logging::LogConfig;
pub use sink::{CertificateConfig, SinkConfig};

use serde::Deserialize;

const ENV_PREFIX: &str = "EVENTGRID_SINK";

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Event Grid sink configuration (endpoint, credential, transport options)
    pub sink: SinkConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `EVENTGRID_SINK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `EVENTGRID_SINK__SINK__ENDPOINT=https://...` -> `sink.endpoint`
    /// - `EVENTGRID_SINK__SINK__CERTIFICATE__CRL_PATHS=a.pem,b.pem` -> list
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        Self::from_vars(None)
    }

    /// Load from an explicit variable map instead of the process environment.
    pub fn from_vars(vars: Option<config::Map<String, String>>) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("sink.certificate.crl_paths")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.sink.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_load_shared_key_config() {
        let config = AppConfig::from_vars(vars(&[
            ("EVENTGRID_SINK__SINK__ENDPOINT", "https://example/events"),
            ("EVENTGRID_SINK__SINK__ACCESS_KEY", "k1"),
        ]))
        .unwrap();

        assert_eq!(config.sink.endpoint, "https://example/events");
        assert_eq!(
            config.sink.access_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("k1")
        );
        assert!(config.sink.certificate.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_vars(vars(&[
            ("EVENTGRID_SINK__SINK__ENDPOINT", "https://example/events"),
            ("EVENTGRID_SINK__SINK__ACCESS_KEY", "k1"),
        ]))
        .unwrap();

        assert_eq!(config.sink.api_version, "2018-01-01");
        assert_eq!(config.sink.request_timeout_secs, 30);
        assert_eq!(config.sink.pool_max_idle_per_host, 8);
        assert_eq!(config.log.level, "info");
        assert!(!config.log.json);
    }

    #[test]
    fn test_load_certificate_config_with_crl_list() {
        let config = AppConfig::from_vars(vars(&[
            ("EVENTGRID_SINK__SINK__ENDPOINT", "https://example/events"),
            ("EVENTGRID_SINK__SINK__CERTIFICATE__CERT_PATH", "/etc/sink/cert.pem"),
            ("EVENTGRID_SINK__SINK__CERTIFICATE__KEY_PATH", "/etc/sink/key.pem"),
            (
                "EVENTGRID_SINK__SINK__CERTIFICATE__CRL_PATHS",
                "/etc/sink/a.crl,/etc/sink/b.crl",
            ),
        ]))
        .unwrap();

        let certificate = config.sink.certificate.as_ref().unwrap();
        assert_eq!(certificate.cert_path, PathBuf::from("/etc/sink/cert.pem"));
        assert_eq!(
            certificate.crl_paths,
            vec![
                PathBuf::from("/etc/sink/a.crl"),
                PathBuf::from("/etc/sink/b.crl")
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_log_settings() {
        let config = AppConfig::from_vars(vars(&[
            ("EVENTGRID_SINK__SINK__ENDPOINT", "https://example/events"),
            ("EVENTGRID_SINK__SINK__ACCESS_KEY", "k1"),
            ("EVENTGRID_SINK__LOG__LEVEL", "debug"),
            ("EVENTGRID_SINK__LOG__JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
    }

    #[test]
    fn test_missing_endpoint_fails_to_load() {
        let result = AppConfig::from_vars(vars(&[("EVENTGRID_SINK__SINK__ACCESS_KEY", "k1")]));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_both_credentials_fail_validation() {
        let config = AppConfig::from_vars(vars(&[
            ("EVENTGRID_SINK__SINK__ENDPOINT", "https://example/events"),
            ("EVENTGRID_SINK__SINK__ACCESS_KEY", "k1"),
            ("EVENTGRID_SINK__SINK__CERTIFICATE__CERT_PATH", "/c.pem"),
            ("EVENTGRID_SINK__SINK__CERTIFICATE__KEY_PATH", "/k.pem"),
            ("EVENTGRID_SINK__SINK__CERTIFICATE__CRL_PATHS", "/a.crl"),
        ]))
        .unwrap();

        assert_eq!(config.validate(), Err(ValidationError::ConflictingCredentials));
    }
}
