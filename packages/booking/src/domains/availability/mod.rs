pub mod models;

pub use models::availability::{Availability, AvailabilityRow};
pub use models::time_off::{TimeOff, TimeOffRow};
