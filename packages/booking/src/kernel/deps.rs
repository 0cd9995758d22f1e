//! Dependency container for booking effects (traits for testability).

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::BookingConfig;
use crate::domains::bookings::models::Booking;
use crate::kernel::store::BookingStore;

/// Post-transition hooks for external collaborators (CRM sync, email).
///
/// Called only after the lifecycle transition has been durably persisted;
/// the core never depends on these for correctness.
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn booking_created(&self, booking: &Booking, manage_url: &str);
    async fn booking_confirmed(&self, booking: &Booking);
    async fn booking_cancelled(&self, booking: &Booking);
    async fn booking_rescheduled(&self, original: &Booking, replacement: &Booking);
}

/// No-op notifier for tests and headless use.
pub struct NoopNotifier;

#[async_trait]
impl BookingNotifier for NoopNotifier {
    async fn booking_created(&self, _booking: &Booking, _manage_url: &str) {}
    async fn booking_confirmed(&self, _booking: &Booking) {}
    async fn booking_cancelled(&self, _booking: &Booking) {}
    async fn booking_rescheduled(&self, _original: &Booking, _replacement: &Booking) {}
}

/// Dependencies accessible to booking effects.
#[derive(Clone)]
pub struct BookingDeps {
    pub store: Arc<dyn BookingStore>,
    pub notifier: Arc<dyn BookingNotifier>,
    pub config: BookingConfig,
}

impl BookingDeps {
    pub fn new(store: Arc<dyn BookingStore>, config: BookingConfig) -> Self {
        Self {
            store,
            notifier: Arc::new(NoopNotifier),
            config,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn BookingNotifier>) -> Self {
        self.notifier = notifier;
        self
    }
}
