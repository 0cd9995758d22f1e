pub mod adapters;
pub mod commands;
pub mod effects;
pub mod ics;
pub mod machines;
pub mod models;
pub mod tokens;

pub use adapters::LegacyBookingView;
pub use commands::{
    CancelBookingInput, CreateBookingInput, RescheduleBookingInput, VerifyManageTokenInput,
};
pub use models::booking::{Booking, BookingRow, BookingSource, BookingStatus, CancellationReason};
