//! HTTP transport posting envelopes to an Event Grid topic endpoint.
//!
//! Every `send` is one POST carrying a JSON array of events. Shared-key
//! transports ride on the process-wide default client; certificate
//! transports own a dedicated connection handler that `release` drops.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

use crate::domain::events::{EventEnvelope, EventPayload};
use crate::domain::foundation::{EventId, Timestamp};
use crate::ports::{CredentialMode, EventTransport, TransportError};

use super::{ConnectionHandler, TransportOptions};

/// Header carrying the access key (or the certificate-mode sentinel).
pub const KEY_HEADER: &str = "aeg-sas-key";

static DEFAULT_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

enum ClientSlot {
    /// Process-wide default client; nothing to release.
    Default(reqwest::Client),
    /// Handler owned by this transport, `None` once released.
    Dedicated(RwLock<Option<ConnectionHandler>>),
}

/// Event Grid transport over HTTPS.
pub struct HttpTransport {
    endpoint: Url,
    api_version: String,
    request_timeout: Duration,
    key_header: Option<SecretString>,
    mode: CredentialMode,
    slot: ClientSlot,
}

impl HttpTransport {
    /// Transport authenticating with an access key on the default client.
    pub(crate) fn shared_key(endpoint: Url, key: SecretString, options: &TransportOptions) -> Self {
        Self {
            endpoint,
            api_version: options.api_version.clone(),
            request_timeout: options.request_timeout,
            key_header: Some(key),
            mode: CredentialMode::SharedKey,
            slot: ClientSlot::Default(DEFAULT_CLIENT.clone()),
        }
    }

    /// Transport authenticating with the client certificate baked into `handler`.
    pub(crate) fn client_certificate(
        endpoint: Url,
        handler: ConnectionHandler,
        sentinel_key: Option<SecretString>,
        options: &TransportOptions,
    ) -> Self {
        Self {
            endpoint,
            api_version: options.api_version.clone(),
            request_timeout: options.request_timeout,
            key_header: sentinel_key,
            mode: CredentialMode::ClientCertificate,
            slot: ClientSlot::Dedicated(RwLock::new(Some(handler))),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Whether this transport still holds a dedicated handler.
    pub fn holds_native_resources(&self) -> bool {
        match &self.slot {
            ClientSlot::Default(_) => false,
            ClientSlot::Dedicated(handler) => handler.read().is_some(),
        }
    }

    fn client(&self) -> Result<reqwest::Client, TransportError> {
        match &self.slot {
            ClientSlot::Default(client) => Ok(client.clone()),
            ClientSlot::Dedicated(handler) => handler
                .read()
                .as_ref()
                .map(|h| h.client().clone())
                .ok_or(TransportError::Released),
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                timeout_ms: u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn send(&self, envelopes: &[EventEnvelope]) -> Result<(), TransportError> {
        let client = self.client()?;

        let sent_at = Timestamp::now();
        let events: Vec<WireEvent<'_>> = envelopes
            .iter()
            .map(|envelope| WireEvent::new(envelope, sent_at))
            .collect();
        let body =
            serde_json::to_vec(&events).map_err(|e| TransportError::Serialization(e.to_string()))?;

        let mut request = client
            .post(self.endpoint.clone())
            .query(&[("api-version", self.api_version.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.request_timeout)
            .body(body);
        if let Some(key) = &self.key_header {
            request = request.header(KEY_HEADER, key.expose_secret().as_str());
        }

        let response = request.send().await.map_err(|e| {
            let err = self.map_send_error(e);
            tracing::warn!(
                endpoint = %self.endpoint,
                credential_mode = %self.mode,
                code = %err.code(),
                error = %err,
                "Event Grid request failed"
            );
            err
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                endpoint = %self.endpoint,
                credential_mode = %self.mode,
                status = status.as_u16(),
                "Event Grid rejected events"
            );
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            credential_mode = %self.mode,
            event_count = envelopes.len(),
            "Delivered events"
        );
        Ok(())
    }

    fn release(&self) {
        match &self.slot {
            ClientSlot::Default(_) => {
                tracing::debug!(endpoint = %self.endpoint, "Shared-key transport released");
            }
            ClientSlot::Dedicated(handler) => {
                // Requests already in flight keep their own client clone
                if handler.write().take().is_some() {
                    tracing::info!(
                        endpoint = %self.endpoint,
                        "Client-certificate connection handler released"
                    );
                }
            }
        }
    }

    fn credential_mode(&self) -> CredentialMode {
        self.mode
    }
}

/// Envelope as posted. The schema requires `id` and `eventTime`, so
/// missing values are filled here rather than in the mapping.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent<'a> {
    id: String,
    subject: &'a str,
    event_type: &'a str,
    data_version: &'a str,
    data: &'a EventPayload,
    event_time: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
}

impl<'a> WireEvent<'a> {
    fn new(envelope: &'a EventEnvelope, sent_at: Timestamp) -> Self {
        Self {
            id: envelope
                .id
                .as_ref()
                .map(|id| id.as_str().to_string())
                .unwrap_or_else(|| EventId::new().to_string()),
            subject: &envelope.subject,
            event_type: &envelope.event_type,
            data_version: &envelope.data_version,
            data: &envelope.data,
            event_time: envelope.event_time.unwrap_or(sent_at),
            topic: envelope.topic.as_deref(),
        }
    }
}
