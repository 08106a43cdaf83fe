//! Transport handle - owns a transport and releases it exactly once.
//!
//! State machine: `InUse → Released`. `Released` is terminal. The release
//! flag is a single compare-exchange, so racing `release` calls (explicit or
//! from `Drop`) reach the transport once.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ports::{CredentialMode, EventTransport, SinkError};

/// Owner of one transport for the lifetime of a sink.
pub struct TransportHandle {
    transport: Arc<dyn EventTransport>,
    released: AtomicBool,
}

impl TransportHandle {
    pub fn new(transport: Arc<dyn EventTransport>) -> Self {
        Self {
            transport,
            released: AtomicBool::new(false),
        }
    }

    pub fn credential_mode(&self) -> CredentialMode {
        self.transport.credential_mode()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Borrow the transport for a publish call.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Released` once `release` has run.
    pub fn transport(&self) -> Result<&dyn EventTransport, SinkError> {
        if self.is_released() {
            return Err(SinkError::Released);
        }
        Ok(self.transport.as_ref())
    }

    /// Release the transport. Returns `true` only for the call that did it.
    pub fn release(&self) -> bool {
        if self
            .released
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        self.transport.release();
        tracing::debug!(
            credential_mode = %self.transport.credential_mode(),
            "Transport handle released"
        );
        true
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportHandle")
            .field("credential_mode", &self.transport.credential_mode())
            .field("released", &self.is_released())
            .finish()
    }
}
