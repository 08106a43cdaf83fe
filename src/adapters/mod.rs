//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `eventgrid` - Event Grid sink and its HTTP transports
//! - `events` - In-memory transport for testing

pub mod eventgrid;
pub mod events;

pub use eventgrid::{
    ClientCertificate, Credential, EventGridSink, TransportBuilder, TransportConstructionError,
    TransportHandle, TransportOptions,
};
pub use events::InMemoryTransport;
