//! Test fixtures for seeding the in-memory store.
//!
//! Effects read the real clock, so fixtures anchor on a Monday a month out:
//! far enough that cancellation and reschedule windows always hold, near
//! enough that realistic `max_advance_days` settings still cover it. All
//! fixture rows use the UTC zone so asserted instants read like wall-clock.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;

use booking_core::common::{AvailabilityId, BookingId, ClientId, ProviderId, ServiceId, TimeOffId};
use booking_core::domains::availability::models::{Availability, TimeOff};
use booking_core::domains::bookings::models::{Booking, BookingStatus};
use booking_core::domains::services::models::Service;

/// First Monday at least 30 days from now.
pub fn target_monday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(30);
    while date.weekday() != Weekday::Mon {
        date += Duration::days(1);
    }
    date
}

/// UTC instant on a fixture date.
pub fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
        .and_utc()
}

/// Monday 09:00-12:00 UTC, 30-minute granularity, 15-minute buffer.
pub fn monday_availability(provider_id: ProviderId) -> Availability {
    Availability {
        id: AvailabilityId::new(),
        provider_id,
        day_of_week: Weekday::Mon,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        is_available: true,
        timezone: "UTC".to_string(),
        slot_minutes: 30,
        buffer_minutes: 15,
        max_advance_days: 60,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A one-hour service.
pub fn haircut(provider_id: ProviderId) -> Service {
    Service {
        id: ServiceId::new(),
        provider_id,
        title: "Signature Haircut".to_string(),
        duration_minutes: 60,
        price: Decimal::new(6500, 2),
        is_visible: true,
        image_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Single-day closure.
pub fn day_off(provider_id: ProviderId, date: NaiveDate) -> TimeOff {
    TimeOff {
        id: TimeOffId::new(),
        provider_id,
        start_date: date,
        end_date: date,
        reason: Some("closed".to_string()),
        created_at: Utc::now(),
    }
}

/// A booking holding `[starts, ends)` in the given status.
pub fn booking_at(
    provider_id: ProviderId,
    service_id: Option<ServiceId>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    status: BookingStatus,
) -> Booking {
    let mut booking = Booking {
        id: BookingId::new(),
        client_id: ClientId::new(),
        provider_id,
        service_id,
        client_name: "Grace Hopper".to_string(),
        client_email: "grace@example.com".to_string(),
        client_phone: None,
        date: starts_at.date_naive(),
        time: starts_at.time(),
        starts_at,
        ends_at,
        status,
        source: Default::default(),
        note: None,
        metadata: serde_json::Value::Null,
        confirmation_sent_at: None,
        reminder_sent_at: None,
        ics_sequence: 0,
        manage_token_hash: None,
        manage_token_expires_at: None,
        cancellation_reason: None,
        rescheduled_from_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    booking.sync_calendar_fields();
    booking
}
