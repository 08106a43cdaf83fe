//! Mock connection handler factory for testing.
//!
//! Captures the settings the transport builder hands to the factory so
//! tests can assert on the TLS configuration (revocation checking, client
//! identity) without real certificate material. Handlers it returns wrap a
//! plain client, so they work against local HTTP mock servers.

use std::time::Duration;

use parking_lot::Mutex;

use super::{
    ConnectionHandler, ConnectionHandlerFactory, HandlerSettings, TransportConstructionError,
};

/// Snapshot of one `create` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedHandlerSettings {
    pub check_certificate_revocation: bool,
    pub presents_identity: bool,
    pub chain_len: usize,
    pub revocation_list_count: usize,
    pub request_timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

/// Connection handler factory that records its inputs.
///
/// # Example
///
/// ```ignore
/// let factory = Arc::new(MockHandlerFactory::new());
/// let builder = TransportBuilder::new(url)?.with_handler_factory(factory.clone());
/// builder.build(Credential::from(certificate))?;
/// assert!(factory.captured()[0].check_certificate_revocation);
/// ```
#[derive(Debug, Default)]
pub struct MockHandlerFactory {
    captured: Mutex<Vec<CapturedHandlerSettings>>,
    error: Option<TransportConstructionError>,
}

impl MockHandlerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose every `create` fails with `error`.
    pub fn failing(error: TransportConstructionError) -> Self {
        Self {
            captured: Mutex::new(Vec::new()),
            error: Some(error),
        }
    }

    /// Settings seen so far, in call order.
    pub fn captured(&self) -> Vec<CapturedHandlerSettings> {
        self.captured.lock().clone()
    }
}

impl ConnectionHandlerFactory for MockHandlerFactory {
    fn create(
        &self,
        settings: &HandlerSettings<'_>,
    ) -> Result<ConnectionHandler, TransportConstructionError> {
        self.captured.lock().push(CapturedHandlerSettings {
            check_certificate_revocation: settings.check_certificate_revocation,
            presents_identity: !settings.certificate.chain().is_empty(),
            chain_len: settings.certificate.chain().len(),
            revocation_list_count: settings.certificate.revocation_lists().len(),
            request_timeout: settings.request_timeout,
            pool_max_idle_per_host: settings.pool_max_idle_per_host,
        });

        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .build()
            .map_err(|e| TransportConstructionError::Client(e.to_string()))?;

        Ok(ConnectionHandler::new(client))
    }
}
