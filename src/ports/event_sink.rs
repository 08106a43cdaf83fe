//! EventSink port - Interface for publishing events.
//!
//! This port gives callers one publish contract regardless of how the
//! underlying transport authenticates (shared key or client certificate).

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::events::Publishable;
use crate::domain::foundation::{ErrorCode, ValidationError};

use super::TransportError;

/// Port for publishing events to an external ingestion endpoint.
///
/// Implementations must ensure:
/// - Events are validated before any network call
/// - `publish_batch` issues exactly one outbound call with envelopes in input order
/// - No internal retries; errors are propagated to the caller
/// - After `release`, every publish fails with `SinkError::Released`
///
/// # Example
///
/// ```ignore
/// let record = EventRecord::new("/a", "Created", "1.0", EventPayload::new(b"x".to_vec()));
/// sink.publish(&record, &CancellationToken::new()).await?;
/// sink.release();
/// ```
#[async_trait]
pub trait EventSink<E>: Send + Sync
where
    E: Publishable + Sync,
{
    /// Publish a single event in one outbound call.
    ///
    /// Fails with `SinkError::Cancelled` if `cancel` fires first.
    async fn publish(&self, event: &E, cancel: &CancellationToken) -> Result<(), SinkError>;

    /// Publish a batch of events in one outbound call.
    ///
    /// An empty batch is still one call, carrying an empty array.
    /// Partial success is not reported; the call succeeds or fails as a whole.
    async fn publish_batch(
        &self,
        events: &[E],
        cancel: &CancellationToken,
    ) -> Result<(), SinkError>;

    /// Release transport resources. Idempotent.
    fn release(&self);

    /// Whether `release` has completed.
    fn is_released(&self) -> bool;
}

/// Errors from publishing through a sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// Event or batch failed validation; nothing was sent.
    #[error("invalid event: {0}")]
    Validation(#[from] ValidationError),

    /// Outbound call failed.
    #[error("publish failed: {0}")]
    Transport(TransportError),

    /// Publish attempted after the sink was released.
    #[error("sink has been released")]
    Released,

    /// Caller cancelled the publish before it completed.
    #[error("publish cancelled")]
    Cancelled,
}

impl SinkError {
    /// Returns the machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SinkError::Validation(e) => e.code(),
            SinkError::Transport(e) => e.code(),
            SinkError::Released => ErrorCode::SinkReleased,
            SinkError::Cancelled => ErrorCode::Cancelled,
        }
    }
}

impl From<TransportError> for SinkError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Released => SinkError::Released,
            other => SinkError::Transport(other),
        }
    }
}
