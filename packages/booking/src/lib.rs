// Glossbook Booking Core
//
// This crate is the appointment booking engine behind the Glossbook
// marketplace: slot generation from recurring availability, the booking
// lifecycle state machine, unauthenticated self-service via manage tokens,
// and ICS calendar interoperability.
//
// The web UI, persistence internals, and CRM integration live elsewhere;
// they talk to this crate through the types in `kernel` and `domains`.

pub mod common;
pub mod config;
pub mod domains;
pub mod error;
pub mod kernel;

pub use config::*;
pub use error::{BookingError, FieldError, ValidationErrors};
