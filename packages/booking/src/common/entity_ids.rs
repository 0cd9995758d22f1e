//! Typed ID aliases for the booking domain entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for service providers (salons, stylists).
pub struct Provider;

/// Marker type for clients (booking customers).
pub struct Client;

/// Marker type for Service entities (a provider's offerings).
pub struct Service;

/// Marker type for Booking entities.
pub struct Booking;

/// Marker type for Availability entities (weekly open-hours rules).
pub struct Availability;

/// Marker type for TimeOff entities (date-range overrides).
pub struct TimeOff;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for providers.
pub type ProviderId = Id<Provider>;

/// Typed ID for clients.
pub type ClientId = Id<Client>;

/// Typed ID for services.
pub type ServiceId = Id<Service>;

/// Typed ID for bookings.
pub type BookingId = Id<Booking>;

/// Typed ID for availability rows.
pub type AvailabilityId = Id<Availability>;

/// Typed ID for time-off rows.
pub type TimeOffId = Id<TimeOff>;
