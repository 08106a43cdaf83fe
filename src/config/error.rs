//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Both an access key and a client certificate are configured")]
    ConflictingCredentials,

    #[error("No credential configured: set an access key or a client certificate")]
    MissingCredential,

    #[error("Endpoint must be an http(s) URL")]
    InvalidEndpoint,

    #[error("Client certificate requires at least one revocation list")]
    RevocationListRequired,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Pool size must be between 1 and 1000")]
    InvalidPoolSize,

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
