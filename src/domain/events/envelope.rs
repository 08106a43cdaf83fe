//! Wire envelope and the record → envelope mapping.

use serde::Serialize;

use crate::domain::foundation::{EventId, Timestamp, ValidationError};

use super::{EventPayload, Publishable};

/// Wire-level representation of one event.
///
/// A flat object with `subject`, `eventType`, `dataVersion`, `data` and,
/// only when the source record carries them, `topic`, `eventTime`, `id`.
/// Mapping is a direct field copy, so the same record always yields the
/// same envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub subject: String,

    pub event_type: String,

    pub data_version: String,

    pub data: EventPayload,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
}

impl EventEnvelope {
    /// Maps a single event, failing fast on empty required fields.
    pub fn from_event<E: Publishable + ?Sized>(event: &E) -> Result<Self, ValidationError> {
        let subject = require("subject", event.subject())?;
        let event_type = require("eventType", event.event_type())?;
        let data_version = require("dataVersion", event.data_version())?;

        Ok(Self {
            subject,
            event_type,
            data_version,
            data: event.payload().clone(),
            topic: event.topic().map(str::to_string),
            event_time: event.event_time(),
            id: event.event_id().cloned(),
        })
    }

    /// Maps a batch, preserving input order.
    ///
    /// An empty batch maps to an empty list. The whole batch is rejected if
    /// any item is invalid; the error carries the position of the first
    /// offending item.
    pub fn from_batch<E: Publishable>(events: &[E]) -> Result<Vec<Self>, ValidationError> {
        events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                Self::from_event(event).map_err(|e| ValidationError::at_index(index, e))
            })
            .collect()
    }
}

fn require(field: &'static str, value: &str) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(value.to_string())
}
