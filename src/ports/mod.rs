//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Publishing Ports
//!
//! - `EventSink` - Uniform publish contract for callers
//! - `EventTransport` - Network delivery of envelopes, owns transport resources

mod event_sink;
mod event_transport;

pub use event_sink::{EventSink, SinkError};
pub use event_transport::{CredentialMode, EventTransport, TransportError};
