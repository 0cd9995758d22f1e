pub mod booking;

pub use booking::{Booking, BookingRow, BookingSource, BookingStatus, CancellationReason};
