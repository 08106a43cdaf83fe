//! Transport builder - turns an endpoint and a credential into a transport handle.
//!
//! Construction is synchronous and performs no network I/O.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::ports::CredentialMode;

use super::{
    ClientCertificate, ConnectionHandlerFactory, Credential, HandlerSettings, HttpTransport,
    RustlsHandlerFactory, TransportConstructionError, TransportHandle,
};

/// Event Grid API version sent as the `api-version` query parameter.
pub const DEFAULT_API_VERSION: &str = "2018-01-01";

/// Tunables shared by both credential paths.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Value of the `api-version` query parameter.
    pub api_version: String,

    /// Whole-request timeout.
    pub request_timeout: Duration,

    /// Idle pooled connections per host (certificate path only).
    pub pool_max_idle_per_host: usize,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 8,
        }
    }
}

impl TransportOptions {
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }
}

/// Builds transport handles bound to one endpoint.
///
/// # Example
///
/// ```ignore
/// let handle = TransportBuilder::new("https://topic.westus-1.eventgrid.azure.net/api/events")?
///     .with_options(TransportOptions::default().with_request_timeout(Duration::from_secs(10)))
///     .build(Credential::shared_key(key))?;
/// ```
pub struct TransportBuilder {
    endpoint: Url,
    options: TransportOptions,
    handler_factory: Arc<dyn ConnectionHandlerFactory>,
}

impl TransportBuilder {
    /// Creates a builder for an endpoint.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEndpoint` if the endpoint is empty, not a URL, has no
    /// host, or uses a scheme other than http(s).
    pub fn new(endpoint: &str) -> Result<Self, TransportConstructionError> {
        let trimmed = endpoint.trim();
        if trimmed.is_empty() {
            return Err(TransportConstructionError::invalid_endpoint(
                endpoint,
                "endpoint cannot be empty",
            ));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| TransportConstructionError::invalid_endpoint(endpoint, e.to_string()))?;
        if !matches!(url.scheme(), "https" | "http") {
            return Err(TransportConstructionError::invalid_endpoint(
                endpoint,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if url.host_str().is_none() {
            return Err(TransportConstructionError::invalid_endpoint(
                endpoint,
                "endpoint has no host",
            ));
        }

        Ok(Self {
            endpoint: url,
            options: TransportOptions::default(),
            handler_factory: Arc::new(RustlsHandlerFactory::new()),
        })
    }

    pub fn with_options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the factory used for the certificate path.
    pub fn with_handler_factory(mut self, factory: Arc<dyn ConnectionHandlerFactory>) -> Self {
        self.handler_factory = factory;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Builds a transport handle for the given credential.
    pub fn build(
        &self,
        credential: Credential,
    ) -> Result<TransportHandle, TransportConstructionError> {
        let mode = credential.mode();
        let transport = match credential {
            Credential::SharedKey(key) => self.build_shared_key(key)?,
            Credential::ClientCertificate(certificate) => {
                self.build_client_certificate(certificate)?
            }
        };

        tracing::info!(
            endpoint = %self.endpoint,
            credential_mode = %mode,
            "Built Event Grid transport"
        );

        Ok(TransportHandle::new(Arc::new(transport)))
    }

    fn build_shared_key(
        &self,
        key: SecretString,
    ) -> Result<HttpTransport, TransportConstructionError> {
        if key.expose_secret().trim().is_empty() {
            return Err(TransportConstructionError::EmptyKey);
        }

        Ok(HttpTransport::shared_key(self.endpoint.clone(), key, &self.options))
    }

    fn build_client_certificate(
        &self,
        certificate: ClientCertificate,
    ) -> Result<HttpTransport, TransportConstructionError> {
        if self.endpoint.scheme() != "https" {
            tracing::warn!(
                endpoint = %self.endpoint,
                credential_mode = %CredentialMode::ClientCertificate,
                "Endpoint is not HTTPS; the client certificate will not be presented"
            );
        }

        let settings = HandlerSettings {
            certificate: &certificate,
            check_certificate_revocation: true,
            request_timeout: self.options.request_timeout,
            pool_max_idle_per_host: self.options.pool_max_idle_per_host,
        };
        let handler = self.handler_factory.create(&settings)?;

        Ok(HttpTransport::client_certificate(
            self.endpoint.clone(),
            handler,
            certificate.sentinel_key().cloned(),
            &self.options,
        ))
    }
}
