//! Event Grid sink - the public publish surface.
//!
//! Maps records to envelopes and hands them to the transport held by its
//! `TransportHandle`. The sink holds no mutable state besides the handle's
//! release flag, so concurrent publishes need no locking.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::SinkConfig;
use crate::domain::events::{EventEnvelope, Publishable};
use crate::ports::{CredentialMode, EventSink, EventTransport, SinkError};

use super::{
    ClientCertificate, Credential, TransportBuilder, TransportConstructionError, TransportHandle,
};

/// Sink publishing to one Event Grid endpoint with one credential.
///
/// # Example
///
/// ```ignore
/// let sink = EventGridSink::with_shared_key("https://topic.example/api/events", key)?;
/// sink.publish(&record, &CancellationToken::new()).await?;
/// sink.publish_batch(&records, &CancellationToken::new()).await?;
/// sink.release();
/// ```
#[derive(Debug)]
pub struct EventGridSink {
    handle: TransportHandle,
}

impl EventGridSink {
    /// Creates a sink for an endpoint and credential with default options.
    pub fn new(endpoint: &str, credential: Credential) -> Result<Self, TransportConstructionError> {
        Self::from_builder(&TransportBuilder::new(endpoint)?, credential)
    }

    /// Creates a sink authenticating with an access key.
    pub fn with_shared_key(
        endpoint: &str,
        key: impl Into<String>,
    ) -> Result<Self, TransportConstructionError> {
        Self::new(endpoint, Credential::shared_key(key))
    }

    /// Creates a sink authenticating with a client certificate.
    pub fn with_certificate(
        endpoint: &str,
        certificate: ClientCertificate,
    ) -> Result<Self, TransportConstructionError> {
        Self::new(endpoint, Credential::ClientCertificate(certificate))
    }

    /// Creates a sink from a configured builder.
    pub fn from_builder(
        builder: &TransportBuilder,
        credential: Credential,
    ) -> Result<Self, TransportConstructionError> {
        Ok(Self {
            handle: builder.build(credential)?,
        })
    }

    /// Creates a sink from configuration.
    ///
    /// The credential is resolved first, so conflicting or missing
    /// credentials fail before any transport exists.
    pub fn from_config(config: &SinkConfig) -> Result<Self, TransportConstructionError> {
        let credential = config.credential()?;
        let builder =
            TransportBuilder::new(&config.endpoint)?.with_options(config.transport_options());
        Self::from_builder(&builder, credential)
    }

    /// Creates a sink over any transport.
    pub fn from_transport(transport: Arc<dyn EventTransport>) -> Self {
        Self {
            handle: TransportHandle::new(transport),
        }
    }

    pub fn credential_mode(&self) -> CredentialMode {
        self.handle.credential_mode()
    }

    /// Release transport resources. Idempotent; later publishes fail with
    /// `SinkError::Released`.
    pub fn release(&self) {
        if self.handle.release() {
            tracing::info!(credential_mode = %self.credential_mode(), "Event sink released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    async fn dispatch(
        &self,
        transport: &dyn EventTransport,
        envelopes: &[EventEnvelope],
        cancel: &CancellationToken,
    ) -> Result<(), SinkError> {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SinkError::Cancelled),
            sent = transport.send(envelopes) => sent.map_err(SinkError::from),
        };

        match &result {
            Ok(()) => tracing::debug!(
                credential_mode = %self.credential_mode(),
                event_count = envelopes.len(),
                "Published events"
            ),
            Err(e) => tracing::warn!(
                credential_mode = %self.credential_mode(),
                event_count = envelopes.len(),
                code = %e.code(),
                error = %e,
                "Publish failed"
            ),
        }

        result
    }
}

#[async_trait]
impl<E> EventSink<E> for EventGridSink
where
    E: Publishable + Sync,
{
    async fn publish(&self, event: &E, cancel: &CancellationToken) -> Result<(), SinkError> {
        let transport = self.handle.transport()?;
        let envelope = EventEnvelope::from_event(event)?;
        self.dispatch(transport, std::slice::from_ref(&envelope), cancel)
            .await
    }

    async fn publish_batch(
        &self,
        events: &[E],
        cancel: &CancellationToken,
    ) -> Result<(), SinkError> {
        let transport = self.handle.transport()?;
        let envelopes = EventEnvelope::from_batch(events)?;
        self.dispatch(transport, &envelopes, cancel).await
    }

    fn release(&self) {
        EventGridSink::release(self)
    }

    fn is_released(&self) -> bool {
        EventGridSink::is_released(self)
    }
}
