//! In-memory harness for effects tests.
//!
//! The effects layer only talks to the `BookingStore` port, so tests run
//! against `MemoryBookingStore` with no database. The store handle is kept
//! alongside the deps for direct seeding and inspection.

use std::sync::Arc;

use booking_core::config::BookingConfig;
use booking_core::kernel::{BookingDeps, MemoryBookingStore};

pub struct TestHarness {
    pub store: Arc<MemoryBookingStore>,
    pub deps: BookingDeps,
}

/// Build a fresh harness with default config.
///
/// Initializes the tracing subscriber to respect RUST_LOG; run tests with
/// `RUST_LOG=debug cargo test -- --nocapture` to see effect logging.
pub fn harness() -> TestHarness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let store = Arc::new(MemoryBookingStore::new());
    let deps = BookingDeps::new(store.clone(), BookingConfig::default());
    TestHarness { store, deps }
}
