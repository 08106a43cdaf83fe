//! Event sink configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::eventgrid::{
    ClientCertificate, Credential, TransportConstructionError, TransportOptions,
    DEFAULT_API_VERSION,
};

/// Event Grid sink configuration
///
/// Exactly one of `access_key` and `certificate` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Topic endpoint URL
    pub endpoint: String,

    /// Shared access key
    #[serde(default)]
    pub access_key: Option<SecretString>,

    /// Client certificate material
    #[serde(default)]
    pub certificate: Option<CertificateConfig>,

    /// `api-version` query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-request deadline in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Idle connections kept per host
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
}

/// PEM files for the client-certificate credential
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateConfig {
    /// Certificate chain, leaf first
    pub cert_path: PathBuf,

    /// Private key for the leaf
    pub key_path: PathBuf,

    /// Revocation lists checked against the server chain
    #[serde(default)]
    pub crl_paths: Vec<PathBuf>,

    /// CA bundle replacing the default trust roots
    #[serde(default)]
    pub ca_bundle_path: Option<PathBuf>,

    /// Placeholder sent in the key header slot
    #[serde(default)]
    pub sentinel_key: Option<String>,
}

impl SinkConfig {
    /// Creates a shared-key configuration with default options.
    pub fn shared_key(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key: Some(SecretString::new(key.into())),
            certificate: None,
            api_version: default_api_version(),
            request_timeout_secs: default_request_timeout(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
        }
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Transport options derived from this configuration.
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions::default()
            .with_api_version(self.api_version.clone())
            .with_request_timeout(self.request_timeout())
            .with_pool_max_idle_per_host(self.pool_max_idle_per_host)
    }

    /// Resolve the configured credential.
    ///
    /// Certificate files are read here; nothing touches the network.
    ///
    /// # Errors
    ///
    /// `ConflictingCredentials` when both are set, `MissingCredential` when
    /// neither is, or the error from loading certificate material.
    pub fn credential(&self) -> Result<Credential, TransportConstructionError> {
        match (&self.access_key, &self.certificate) {
            (Some(_), Some(_)) => Err(TransportConstructionError::ConflictingCredentials),
            (None, None) => Err(TransportConstructionError::MissingCredential),
            (Some(key), None) => Ok(Credential::SharedKey(key.clone())),
            (None, Some(certificate)) => certificate.load().map(Credential::ClientCertificate),
        }
    }

    /// Validate sink configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.endpoint.trim().is_empty() {
            return Err(ValidationError::MissingRequired("SINK__ENDPOINT"));
        }
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(ValidationError::InvalidEndpoint);
        }

        match (&self.access_key, &self.certificate) {
            (Some(_), Some(_)) => return Err(ValidationError::ConflictingCredentials),
            (None, None) => return Err(ValidationError::MissingCredential),
            (Some(key), None) if key.expose_secret().trim().is_empty() => {
                return Err(ValidationError::MissingRequired("SINK__ACCESS_KEY"));
            }
            (None, Some(certificate)) if certificate.crl_paths.is_empty() => {
                return Err(ValidationError::RevocationListRequired);
            }
            _ => {}
        }

        if self.api_version.trim().is_empty() {
            return Err(ValidationError::MissingRequired("SINK__API_VERSION"));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.pool_max_idle_per_host == 0 || self.pool_max_idle_per_host > 1000 {
            return Err(ValidationError::InvalidPoolSize);
        }

        Ok(())
    }
}

impl CertificateConfig {
    /// Read and parse the configured PEM files.
    pub fn load(&self) -> Result<ClientCertificate, TransportConstructionError> {
        let mut certificate = ClientCertificate::from_pem_files(&self.cert_path, &self.key_path)?
            .with_revocation_list_files(&self.crl_paths)?;

        if let Some(path) = &self.ca_bundle_path {
            let pem = std::fs::read(path).map_err(|e| {
                TransportConstructionError::InvalidCertificate(format!("{}: {}", path.display(), e))
            })?;
            certificate = certificate.with_trust_roots_pem(&pem)?;
        }
        if let Some(sentinel) = &self.sentinel_key {
            certificate = certificate.with_sentinel_key(sentinel.clone());
        }

        Ok(certificate)
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_pool_max_idle_per_host() -> usize {
    8
}
