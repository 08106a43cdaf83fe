//! Event Grid Sink - publishing domain events to an Event Grid endpoint
//!
//! Records are mapped to Event Grid envelopes and sent over one of two
//! transports: a shared access key header, or a mutual-TLS client
//! certificate with mandatory revocation checking.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
