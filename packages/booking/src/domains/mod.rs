// Business domains
pub mod availability;
pub mod bookings;
pub mod services;
pub mod slots;
