//! EventTransport port - Interface for delivering envelopes to the ingestion endpoint.
//!
//! A transport is bound to one endpoint and one credential. It may own
//! native network/TLS resources, which are freed by `release`.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::domain::events::EventEnvelope;
use crate::domain::foundation::ErrorCode;

/// How the transport authenticates to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialMode {
    /// Static access key sent with each request.
    SharedKey,
    /// Client certificate presented during the TLS handshake.
    ClientCertificate,
}

impl fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialMode::SharedKey => write!(f, "shared_key"),
            CredentialMode::ClientCertificate => write!(f, "client_certificate"),
        }
    }
}

/// Port for sending envelopes over the network.
///
/// Implementations must ensure:
/// - `send` issues exactly one outbound call per invocation, carrying every
///   envelope in the given order
/// - `send` only reads transport state, so concurrent calls are independent
/// - `release` frees owned native resources; after it, `send` fails with
///   `TransportError::Released`
///
/// Callers go through `TransportHandle`, which guarantees `release` runs
/// at most once.
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Deliver envelopes in a single call.
    async fn send(&self, envelopes: &[EventEnvelope]) -> Result<(), TransportError>;

    /// Free native resources owned by this transport.
    fn release(&self);

    /// The credential mode this transport was built with.
    fn credential_mode(&self) -> CredentialMode;
}

/// Errors from delivering envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not reach the endpoint or complete the TLS handshake.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Request exceeded the configured timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// Endpoint answered with a non-success status.
    #[error("endpoint rejected the request with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Envelopes could not be encoded.
    #[error("failed to encode events: {0}")]
    Serialization(String),

    /// Any other request failure.
    #[error("request failed: {0}")]
    Request(String),

    /// Transport resources were already released.
    #[error("transport has been released")]
    Released,
}

impl TransportError {
    /// Returns the machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            TransportError::Connect(_) => ErrorCode::ConnectionFailed,
            TransportError::Timeout { .. } => ErrorCode::Timeout,
            TransportError::Rejected { .. } => ErrorCode::Rejected,
            TransportError::Serialization(_) => ErrorCode::SerializationFailed,
            TransportError::Request(_) => ErrorCode::NetworkError,
            TransportError::Released => ErrorCode::SinkReleased,
        }
    }
}
