//! Construction-time errors for Event Grid transports.

use thiserror::Error;

/// Errors raised while building a transport, never at publish time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportConstructionError {
    #[error("both an access key and a client certificate were supplied")]
    ConflictingCredentials,

    #[error("no credential supplied: provide an access key or a client certificate")]
    MissingCredential,

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("access key cannot be empty")]
    EmptyKey,

    #[error("invalid client certificate: {0}")]
    InvalidCertificate(String),

    #[error("certificate revocation checking requires at least one revocation list")]
    RevocationListRequired,

    #[error("TLS configuration failed: {0}")]
    Tls(String),

    #[error("HTTP client construction failed: {0}")]
    Client(String),
}

impl TransportConstructionError {
    pub(crate) fn invalid_endpoint(endpoint: &str, reason: impl Into<String>) -> Self {
        TransportConstructionError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}
