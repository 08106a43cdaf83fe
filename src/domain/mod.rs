//! Domain layer containing event types and shared primitives.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `events` - Publishable events and their wire envelope

pub mod events;
pub mod foundation;
