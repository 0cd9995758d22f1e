//! Storage port for the booking core.
//!
//! The core performs no IO of its own; effects talk to whatever implements
//! this trait. The one hard contract is `insert_if_free`: the implementation
//! must make "insert booking iff no overlapping non-cancelled booking exists
//! for this provider" atomic (unique constraint, transactional re-check, or
//! equivalent), because two customers racing for the same slot must produce
//! at most one success.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{BookingId, ProviderId, ServiceId};
use crate::domains::availability::models::{Availability, TimeOff};
use crate::domains::bookings::models::Booking;
use crate::domains::services::models::Service;

/// Outcome of an atomic conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// An overlapping active booking already holds the interval.
    Conflict,
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_service(&self, id: ServiceId) -> Result<Option<Service>>;

    async fn availability_for_provider(&self, provider_id: ProviderId)
        -> Result<Vec<Availability>>;

    async fn time_off_for_provider(&self, provider_id: ProviderId) -> Result<Vec<TimeOff>>;

    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>>;

    /// Bookings for a provider intersecting `[from, to)`, excluding rows
    /// whose status released the interval (cancelled, rescheduled).
    async fn active_bookings(
        &self,
        provider_id: ProviderId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>>;

    /// Atomic "insert iff the interval is free" (see module docs).
    async fn insert_if_free(&self, booking: &Booking) -> Result<InsertOutcome>;

    /// Persist an updated booking (status/token/sequence changes).
    async fn update_booking(&self, booking: &Booking) -> Result<()>;

    /// Atomically freeze the original as rescheduled and insert the
    /// replacement iff its interval is free. Concurrent slot queries must
    /// never observe one change without the other.
    async fn reschedule_pair(
        &self,
        original: &Booking,
        replacement: &Booking,
    ) -> Result<InsertOutcome>;
}
