//! Booking lifecycle state machine.
//!
//! Pure decision logic - NO IO, only state transitions. Every function takes
//! the booking and `now`, and either returns the mutated copy (or pair) or
//! `InvalidTransition` leaving the input untouched. The effects layer owns
//! persistence and notification.

use chrono::{DateTime, Duration, Utc};

use crate::common::BookingId;
use crate::domains::bookings::models::{Booking, BookingStatus, CancellationReason};
use crate::error::BookingError;

/// Minimum lead time before `starts_at` for a reschedule to be legal.
pub const RESCHEDULE_MIN_LEAD_MINUTES: i64 = 120;

/// Minimum lead time before `starts_at` for a cancellation to be legal.
pub const CANCEL_MIN_LEAD_MINUTES: i64 = 60;

fn within_window(booking: &Booking, now: DateTime<Utc>, lead_minutes: i64) -> bool {
    booking.starts_at - now > Duration::minutes(lead_minutes)
}

/// `pending` → `confirmed`. Sets `confirmation_sent_at`.
pub fn confirm(booking: &Booking, now: DateTime<Utc>) -> Result<Booking, BookingError> {
    if !booking.status.can_transition_to(BookingStatus::Confirmed) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            action: "confirm",
        });
    }
    let mut confirmed = booking.clone();
    confirmed.status = BookingStatus::Confirmed;
    confirmed.confirmation_sent_at = Some(now);
    confirmed.updated_at = now;
    Ok(confirmed)
}

/// `pending`|`confirmed` → `cancelled`, only inside the cancellation window.
///
/// Bumps the ICS sequence so calendar clients see a CANCEL update rather
/// than a duplicate event.
pub fn cancel(
    booking: &Booking,
    reason: CancellationReason,
    now: DateTime<Utc>,
) -> Result<Booking, BookingError> {
    if !booking.status.can_transition_to(BookingStatus::Cancelled) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            action: "cancel",
        });
    }
    if !within_window(booking, now, CANCEL_MIN_LEAD_MINUTES) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            action: "cancel",
        });
    }
    let mut cancelled = booking.clone();
    cancelled.status = BookingStatus::Cancelled;
    cancelled.cancellation_reason = Some(reason);
    cancelled.ics_sequence += 1;
    cancelled.updated_at = now;
    Ok(cancelled)
}

/// Outcome of a legal reschedule: the frozen original plus its replacement.
#[derive(Debug, Clone)]
pub struct Rescheduled {
    /// Original booking, now terminal `rescheduled`.
    pub original: Booking,
    /// New `pending` booking at the requested time, linked by
    /// `rescheduled_from_id`.
    pub replacement: Booking,
}

/// `pending`|`confirmed` → `rescheduled` + new `pending` booking.
///
/// The original is never edited in place; it freezes as an audit record and
/// the replacement re-enters the lifecycle at `pending`. Callers must have
/// already validated the target interval against fresh slot data.
pub fn reschedule(
    booking: &Booking,
    new_starts_at: DateTime<Utc>,
    new_ends_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Rescheduled, BookingError> {
    if !booking.status.can_transition_to(BookingStatus::Rescheduled) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            action: "reschedule",
        });
    }
    if !within_window(booking, now, RESCHEDULE_MIN_LEAD_MINUTES) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            action: "reschedule",
        });
    }
    if new_ends_at <= new_starts_at {
        return Err(BookingError::field("ends_at", "must be after starts_at"));
    }

    let mut original = booking.clone();
    original.status = BookingStatus::Rescheduled;
    original.ics_sequence += 1;
    original.updated_at = now;

    let mut replacement = Booking {
        id: BookingId::new(),
        client_id: booking.client_id,
        provider_id: booking.provider_id,
        service_id: booking.service_id,
        client_name: booking.client_name.clone(),
        client_email: booking.client_email.clone(),
        client_phone: booking.client_phone.clone(),
        date: new_starts_at.date_naive(),
        time: new_starts_at.time(),
        starts_at: new_starts_at,
        ends_at: new_ends_at,
        status: BookingStatus::Pending,
        source: booking.source,
        note: booking.note.clone(),
        metadata: booking.metadata.clone(),
        confirmation_sent_at: None,
        reminder_sent_at: None,
        ics_sequence: 0,
        manage_token_hash: None,
        manage_token_expires_at: None,
        cancellation_reason: None,
        rescheduled_from_id: Some(booking.id),
        created_at: now,
        updated_at: now,
    };
    replacement.sync_calendar_fields();

    Ok(Rescheduled {
        original,
        replacement,
    })
}

/// `confirmed` → `completed`, once the appointment has ended.
///
/// The clock that fires this lives outside the core; this only rules on
/// legality.
pub fn complete(booking: &Booking, now: DateTime<Utc>) -> Result<Booking, BookingError> {
    if !booking.status.can_transition_to(BookingStatus::Completed) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            action: "complete",
        });
    }
    if booking.ends_at > now {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            action: "complete",
        });
    }
    let mut completed = booking.clone();
    completed.status = BookingStatus::Completed;
    completed.updated_at = now;
    Ok(completed)
}
