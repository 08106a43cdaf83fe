//! Connection handlers for the client-certificate transport.
//!
//! A connection handler is the TLS client configuration (client identity,
//! trust roots, revocation lists) together with the pooled HTTP client built
//! on top of it. The certificate transport owns one handler and drops it
//! when released.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rustls::client::WebPkiServerVerifier;
use rustls::{ClientConfig, RootCertStore};

use super::{ClientCertificate, TransportConstructionError};

/// Everything a factory needs to build a connection handler.
#[derive(Debug)]
pub struct HandlerSettings<'a> {
    /// Identity presented during the handshake.
    pub certificate: &'a ClientCertificate,

    /// Verify the server chain against the certificate's revocation lists.
    pub check_certificate_revocation: bool,

    /// Whole-request timeout applied by the client.
    pub request_timeout: Duration,

    /// Idle connections kept per host in the pool.
    pub pool_max_idle_per_host: usize,
}

/// TLS-configured, connection-pooling HTTP client owned by one transport.
pub struct ConnectionHandler {
    client: reqwest::Client,
}

impl ConnectionHandler {
    /// Wraps a client that was configured for a client certificate.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// The pooled client. Cloning shares the pool.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl fmt::Debug for ConnectionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandler").finish_non_exhaustive()
    }
}

/// Builds connection handlers from handler settings.
///
/// Must not perform network I/O.
pub trait ConnectionHandlerFactory: Send + Sync {
    fn create(
        &self,
        settings: &HandlerSettings<'_>,
    ) -> Result<ConnectionHandler, TransportConstructionError>;
}

/// Builds handlers on rustls with the ring crypto provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustlsHandlerFactory;

impl RustlsHandlerFactory {
    pub fn new() -> Self {
        Self
    }

    fn client_config(
        &self,
        settings: &HandlerSettings<'_>,
    ) -> Result<ClientConfig, TransportConstructionError> {
        let certificate = settings.certificate;
        let provider = Arc::new(rustls::crypto::ring::default_provider());

        let mut roots = RootCertStore::empty();
        if certificate.trust_roots().is_empty() {
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        } else {
            for ca in certificate.trust_roots() {
                roots
                    .add(ca.clone())
                    .map_err(|e| TransportConstructionError::Tls(format!("trust root: {}", e)))?;
            }
        }

        let mut verifier =
            WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider.clone());
        if settings.check_certificate_revocation {
            verifier = verifier.with_crls(certificate.revocation_lists().iter().cloned());
        }
        let verifier = verifier
            .build()
            .map_err(|e| TransportConstructionError::Tls(e.to_string()))?;

        ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| TransportConstructionError::Tls(e.to_string()))?
            .with_webpki_verifier(verifier)
            .with_client_auth_cert(
                certificate.chain().to_vec(),
                certificate.private_key().clone_key(),
            )
            .map_err(|e| TransportConstructionError::InvalidCertificate(e.to_string()))
    }
}

impl ConnectionHandlerFactory for RustlsHandlerFactory {
    fn create(
        &self,
        settings: &HandlerSettings<'_>,
    ) -> Result<ConnectionHandler, TransportConstructionError> {
        // rustls skips revocation entirely when given no CRLs
        if settings.check_certificate_revocation
            && settings.certificate.revocation_lists().is_empty()
        {
            return Err(TransportConstructionError::RevocationListRequired);
        }

        let tls = self.client_config(settings)?;

        let client = reqwest::Client::builder()
            .use_preconfigured_tls(tls)
            .https_only(true)
            .timeout(settings.request_timeout)
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .build()
            .map_err(|e| TransportConstructionError::Client(e.to_string()))?;

        tracing::debug!(
            chain_len = settings.certificate.chain().len(),
            revocation_lists = settings.certificate.revocation_lists().len(),
            custom_trust_roots = !settings.certificate.trust_roots().is_empty(),
            "Built client-certificate connection handler"
        );

        Ok(ConnectionHandler::new(client))
    }
}
