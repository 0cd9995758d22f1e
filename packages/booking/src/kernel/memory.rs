//! In-memory `BookingStore` for tests and local development.
//!
//! A single mutex guards all tables, which trivially satisfies the
//! atomic-insert contract: the overlap check and the insert happen under one
//! lock acquisition.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::common::{BookingId, ProviderId, ServiceId};
use crate::domains::availability::models::{Availability, TimeOff};
use crate::domains::bookings::models::Booking;
use crate::domains::services::models::Service;
use crate::kernel::store::{BookingStore, InsertOutcome};

#[derive(Default)]
struct Tables {
    services: HashMap<ServiceId, Service>,
    availability: Vec<Availability>,
    time_off: Vec<TimeOff>,
    bookings: HashMap<BookingId, Booking>,
}

#[derive(Default)]
pub struct MemoryBookingStore {
    tables: Mutex<Tables>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_service(&self, service: Service) {
        self.tables
            .lock()
            .unwrap()
            .services
            .insert(service.id, service);
    }

    pub fn seed_availability(&self, row: Availability) {
        self.tables.lock().unwrap().availability.push(row);
    }

    pub fn seed_time_off(&self, row: TimeOff) {
        self.tables.lock().unwrap().time_off.push(row);
    }

    pub fn seed_booking(&self, booking: Booking) {
        self.tables
            .lock()
            .unwrap()
            .bookings
            .insert(booking.id, booking);
    }

    fn interval_taken(tables: &Tables, booking: &Booking, released: Option<BookingId>) -> bool {
        tables.bookings.values().any(|b| {
            b.id != booking.id
                && Some(b.id) != released
                && b.provider_id == booking.provider_id
                && b.blocks_slot()
                && b.overlaps(booking.starts_at, booking.ends_at)
        })
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn find_service(&self, id: ServiceId) -> Result<Option<Service>> {
        Ok(self.tables.lock().unwrap().services.get(&id).cloned())
    }

    async fn availability_for_provider(
        &self,
        provider_id: ProviderId,
    ) -> Result<Vec<Availability>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .availability
            .iter()
            .filter(|a| a.provider_id == provider_id)
            .cloned()
            .collect())
    }

    async fn time_off_for_provider(&self, provider_id: ProviderId) -> Result<Vec<TimeOff>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .time_off
            .iter()
            .filter(|t| t.provider_id == provider_id)
            .cloned()
            .collect())
    }

    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>> {
        Ok(self.tables.lock().unwrap().bookings.get(&id).cloned())
    }

    async fn active_bookings(
        &self,
        provider_id: ProviderId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .tables
            .lock()
            .unwrap()
            .bookings
            .values()
            .filter(|b| {
                b.provider_id == provider_id && b.blocks_slot() && b.overlaps(from, to)
            })
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.starts_at);
        Ok(bookings)
    }

    async fn insert_if_free(&self, booking: &Booking) -> Result<InsertOutcome> {
        let mut tables = self.tables.lock().unwrap();
        if Self::interval_taken(&tables, booking, None) {
            return Ok(InsertOutcome::Conflict);
        }
        tables.bookings.insert(booking.id, booking.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn update_booking(&self, booking: &Booking) -> Result<()> {
        self.tables
            .lock()
            .unwrap()
            .bookings
            .insert(booking.id, booking.clone());
        Ok(())
    }

    async fn reschedule_pair(
        &self,
        original: &Booking,
        replacement: &Booking,
    ) -> Result<InsertOutcome> {
        // The original releases its interval in the same atomic step, so it
        // never conflicts with its own replacement.
        let mut tables = self.tables.lock().unwrap();
        if Self::interval_taken(&tables, replacement, Some(original.id)) {
            return Ok(InsertOutcome::Conflict);
        }
        tables.bookings.insert(original.id, original.clone());
        tables.bookings.insert(replacement.id, replacement.clone());
        Ok(InsertOutcome::Inserted)
    }
}
