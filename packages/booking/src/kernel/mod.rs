// Kernel: dependency container and the storage port the persistence layer
// implements.

pub mod deps;
pub mod memory;
pub mod pg;
pub mod store;

pub use deps::{BookingDeps, BookingNotifier, NoopNotifier};
pub use memory::MemoryBookingStore;
pub use pg::PgBookingStore;
pub use store::{BookingStore, InsertOutcome};
