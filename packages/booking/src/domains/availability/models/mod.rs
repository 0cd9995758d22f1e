pub mod availability;
pub mod time_off;

pub use availability::{Availability, AvailabilityRow};
pub use time_off::{TimeOff, TimeOffRow};
