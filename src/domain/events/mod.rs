//! Event domain: what gets published and how it looks on the wire.
//!
//! - `Publishable` - Capability every publishable event satisfies
//! - `EventRecord` - Ready-made publishable event
//! - `EventPayload` - Opaque event content
//! - `EventEnvelope` - Wire representation, mapped from any `Publishable`

mod envelope;
mod payload;
mod record;

pub use envelope::EventEnvelope;
pub use payload::EventPayload;
pub use record::{EventRecord, Publishable};
