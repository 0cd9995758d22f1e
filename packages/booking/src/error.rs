//! Error taxonomy for the booking core.
//!
//! Every failure is a structured value the caller can branch on; nothing in
//! this crate retries internally. Token failures deliberately collapse to a
//! single variant so callers cannot distinguish expired from mismatched from
//! unknown.

use serde::Serialize;
use thiserror::Error;

use crate::domains::bookings::models::BookingStatus;

/// A single violated input field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Validation failure enumerating every violated field, not just the first.
#[derive(Debug, Clone, Serialize, Error)]
#[error("validation failed: {}", .fields.iter().map(|f| f.field.as_str()).collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new(fields: Vec<FieldError>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Booking core errors.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The state machine does not permit this lifecycle change.
    #[error("invalid transition: cannot {action} a {from:?} booking")]
    InvalidTransition {
        from: BookingStatus,
        action: &'static str,
    },

    /// An otherwise-valid request lost a race for the slot. The caller should
    /// re-fetch slots and re-pick; the core never retries on its own.
    #[error("the requested slot is no longer available")]
    SlotNoLongerAvailable,

    /// Expired, mismatched, or unknown manage token. One variant on purpose.
    #[error("this manage link is no longer valid")]
    TokenInvalid,

    #[error("booking not found")]
    NotFound,

    /// Storage-layer failure surfaced from the `BookingStore` port.
    #[error("storage error: {0}")]
    Store(#[from] anyhow::Error),
}

impl BookingError {
    /// Shortcut for a single-field validation failure.
    pub fn field(field: &str, message: &str) -> Self {
        BookingError::Validation(ValidationErrors::new(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }]))
    }
}
