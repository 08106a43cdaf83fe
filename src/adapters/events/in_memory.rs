//! In-memory event transport for testing.
//!
//! Records every send call instead of talking to the network, so sink
//! behavior can be asserted deterministically.
//!
//! # Security Note
//!
//! This adapter is for **testing only**. Use the Event Grid HTTP transport
//! in production.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::events::EventEnvelope;
use crate::ports::{CredentialMode, EventTransport, TransportError};

/// In-memory transport for testing.
///
/// Features:
/// - Call capture (one entry per `send`, envelopes in order)
/// - Release counting
/// - Injectable failure for the next send
/// - Optional latency for cancellation tests
///
/// # Example
///
/// ```ignore
/// let transport = Arc::new(InMemoryTransport::new());
/// let sink = EventGridSink::from_transport(transport.clone());
///
/// sink.publish(&record, &CancellationToken::new()).await?;
///
/// assert_eq!(transport.call_count(), 1);
/// ```
#[derive(Debug)]
pub struct InMemoryTransport {
    mode: CredentialMode,
    calls: Mutex<Vec<Vec<EventEnvelope>>>,
    next_error: Mutex<Option<TransportError>>,
    latency: Mutex<Duration>,
    releases: AtomicUsize,
}

impl InMemoryTransport {
    /// Creates a transport reporting the shared-key credential mode.
    pub fn new() -> Self {
        Self::with_mode(CredentialMode::SharedKey)
    }

    pub fn with_mode(mode: CredentialMode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
            next_error: Mutex::new(None),
            latency: Mutex::new(Duration::ZERO),
            releases: AtomicUsize::new(0),
        }
    }

    /// Delays every send by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.set_latency(latency);
        self
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Makes the next send fail with `error`.
    pub fn fail_next(&self, error: TransportError) {
        *self.next_error.lock() = Some(error);
    }

    // === Test Helpers ===

    /// Returns every recorded send call.
    pub fn calls(&self) -> Vec<Vec<EventEnvelope>> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns all envelopes across calls, flattened in send order.
    pub fn sent_envelopes(&self) -> Vec<EventEnvelope> {
        self.calls.lock().iter().flatten().cloned().collect()
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Clears recorded calls (for test isolation).
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventTransport for InMemoryTransport {
    async fn send(&self, envelopes: &[EventEnvelope]) -> Result<(), TransportError> {
        if self.release_count() > 0 {
            return Err(TransportError::Released);
        }

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.calls.lock().push(envelopes.to_vec());

        match self.next_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn credential_mode(&self) -> CredentialMode {
        self.mode
    }
}
