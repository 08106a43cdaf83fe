//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors detected while validating events, before anything reaches a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: &'static str },

    #[error("Event at position {index} is invalid: {source}")]
    InvalidBatchItem {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: &'static str) -> Self {
        ValidationError::EmptyField { field }
    }

    /// Wraps an item error with its position in a batch.
    pub fn at_index(index: usize, source: ValidationError) -> Self {
        ValidationError::InvalidBatchItem {
            index,
            source: Box::new(source),
        }
    }

    /// Returns the machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::InvalidBatchItem { source, .. } => source.code(),
        }
    }
}

/// Error codes organized by category.
///
/// Used as a stable `code` field in structured log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    EmptyField,

    // Lifecycle errors
    SinkReleased,
    Cancelled,

    // Transport errors
    ConnectionFailed,
    Timeout,
    Rejected,
    SerializationFailed,
    NetworkError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::SinkReleased => "SINK_RELEASED",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::ConnectionFailed => "CONNECTION_FAILED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Rejected => "REJECTED",
            ErrorCode::SerializationFailed => "SERIALIZATION_FAILED",
            ErrorCode::NetworkError => "NETWORK_ERROR",
        };
        write!(f, "{}", s)
    }
}
