//! Event Grid adapter.
//!
//! Publishes envelopes to an Event Grid topic endpoint over HTTPS with one
//! of two credentials:
//!
//! - Shared key - the access key travels in the `aeg-sas-key` header over
//!   the process-wide default client
//! - Client certificate - a dedicated rustls client presents the identity
//!   during the handshake, with revocation checking always on
//!
//! `EventGridSink` is the entry point. `TransportBuilder` and
//! `TransportHandle` are exposed for callers that need finer control.

mod credential;
mod error;
mod http_transport;
mod lifecycle;
mod mock_handler_factory;
mod sink;
mod tls;
mod transport_builder;

pub use credential::{ClientCertificate, Credential};
pub use error::TransportConstructionError;
pub use http_transport::{HttpTransport, KEY_HEADER};
pub use lifecycle::TransportHandle;
pub use mock_handler_factory::{CapturedHandlerSettings, MockHandlerFactory};
pub use sink::EventGridSink;
pub use tls::{ConnectionHandler, ConnectionHandlerFactory, HandlerSettings, RustlsHandlerFactory};
pub use transport_builder::{TransportBuilder, TransportOptions, DEFAULT_API_VERSION};
