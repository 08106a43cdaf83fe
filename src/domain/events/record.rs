//! Event records and the `Publishable` capability.

use crate::domain::foundation::{EventId, Timestamp};

use super::EventPayload;

// ============================================
// Publishable Trait
// ============================================

/// Capability shared by everything a sink can publish.
///
/// Only subject, event type, data version and payload are required.
/// The optional accessors default to `None`, so a type carrying just the
/// four required fields publishes without extra code. Use the
/// `publishable!` macro to implement this trait for plain structs.
pub trait Publishable {
    /// Resource path relative to the topic (e.g., "/patients/p-1").
    fn subject(&self) -> &str;

    /// Kind of occurrence (e.g., "Patient.Created").
    fn event_type(&self) -> &str;

    /// Schema version of the payload (e.g., "1.0").
    fn data_version(&self) -> &str;

    /// Serialized event content.
    fn payload(&self) -> &EventPayload;

    /// Topic overriding the endpoint's default topic.
    fn topic(&self) -> Option<&str> {
        None
    }

    /// When the event occurred. The receiver assigns one if absent.
    fn event_time(&self) -> Option<Timestamp> {
        None
    }

    /// Idempotency key. A fresh one is assigned at send time if absent.
    fn event_id(&self) -> Option<&EventId> {
        None
    }
}

/// Macro to implement `Publishable` for a struct with minimal boilerplate.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone)]
/// pub struct ObservationSaved {
///     pub resource_path: String,
///     pub body: EventPayload,
/// }
///
/// publishable!(
///     ObservationSaved,
///     subject = resource_path,
///     event_type = "Observation.Saved",
///     data_version = "1.0",
///     payload = body
/// );
/// ```
#[macro_export]
macro_rules! publishable {
    (
        $event_name:ident,
        subject = $subject_field:ident,
        event_type = $event_type:expr,
        data_version = $data_version:expr,
        payload = $payload_field:ident
    ) => {
        impl $crate::domain::events::Publishable for $event_name {
            fn subject(&self) -> &str {
                &self.$subject_field
            }

            fn event_type(&self) -> &str {
                $event_type
            }

            fn data_version(&self) -> &str {
                $data_version
            }

            fn payload(&self) -> &$crate::domain::events::EventPayload {
                &self.$payload_field
            }
        }
    };
}

// ============================================
// EventRecord
// ============================================

/// One outbound event.
///
/// Built once by the caller and read-only afterwards; sinks only borrow it.
///
/// # Example
///
/// ```ignore
/// let record = EventRecord::new("/a", "Created", "1.0", EventPayload::new(b"x".to_vec()))
///     .with_topic("/subscriptions/s/topics/t")
///     .with_id(EventId::from_string("a-created-1"));
/// sink.publish(&record, &CancellationToken::new()).await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    subject: String,
    event_type: String,
    data_version: String,
    payload: EventPayload,
    topic: Option<String>,
    event_time: Option<Timestamp>,
    id: Option<EventId>,
}

impl EventRecord {
    /// Creates a record with the required fields.
    ///
    /// Emptiness is checked by the sink at publish time, not here.
    pub fn new(
        subject: impl Into<String>,
        event_type: impl Into<String>,
        data_version: impl Into<String>,
        payload: impl Into<EventPayload>,
    ) -> Self {
        Self {
            subject: subject.into(),
            event_type: event_type.into(),
            data_version: data_version.into(),
            payload: payload.into(),
            topic: None,
            event_time: None,
            id: None,
        }
    }

    /// Set the topic override.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set the occurrence time.
    pub fn with_event_time(mut self, event_time: Timestamp) -> Self {
        self.event_time = Some(event_time);
        self
    }

    /// Set a stable idempotency key.
    pub fn with_id(mut self, id: EventId) -> Self {
        self.id = Some(id);
        self
    }
}

impl Publishable for EventRecord {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn data_version(&self) -> &str {
        &self.data_version
    }

    fn payload(&self) -> &EventPayload {
        &self.payload
    }

    fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    fn event_time(&self) -> Option<Timestamp> {
        self.event_time
    }

    fn event_id(&self) -> Option<&EventId> {
        self.id.as_ref()
    }
}

#[cfg(test)]
impl EventRecord {
    /// Creates a test fixture record with only the required fields.
    pub fn test_fixture() -> Self {
        Self::new("/a", "Created", "1.0", EventPayload::new(b"x".to_vec()))
    }
}
