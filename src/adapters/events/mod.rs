//! In-process event transport adapters.
//!
//! - `InMemoryTransport` - records send calls for testing

mod in_memory;

pub use in_memory::InMemoryTransport;
