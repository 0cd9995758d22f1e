//! Legacy view adapters for bookings.
//!
//! The pre-unification UI talks in `sender`/`recipient` and flat date/time
//! strings. These adapters are pure and lossless in the domain→legacy
//! direction for the fields they expose.

use serde::Serialize;

use super::models::Booking;
use crate::common::{BookingId, ClientId, ProviderId, ServiceId};

/// Booking as the legacy inbox screens expect it.
#[derive(Debug, Clone, Serialize)]
pub struct LegacyBookingView {
    pub id: BookingId,
    /// Alias of `Booking::client_id`.
    pub sender_id: ClientId,
    /// Alias of `Booking::provider_id`.
    pub recipient_id: ProviderId,
    pub service_id: Option<ServiceId>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// `YYYY-MM-DD` (UTC calendar date of the start instant).
    pub date: String,
    /// `HH:MM` (UTC wall-clock of the start instant).
    pub time: String,
    pub status: String,
    pub note: Option<String>,
}

impl From<&Booking> for LegacyBookingView {
    fn from(booking: &Booking) -> Self {
        LegacyBookingView {
            id: booking.id,
            sender_id: booking.client_id,
            recipient_id: booking.provider_id,
            service_id: booking.service_id,
            name: booking.client_name.clone(),
            email: booking.client_email.clone(),
            phone: booking.client_phone.clone(),
            date: booking.date.format("%Y-%m-%d").to_string(),
            time: booking.time.format("%H:%M").to_string(),
            status: booking.status.as_str().to_string(),
            note: booking.note.clone(),
        }
    }
}
