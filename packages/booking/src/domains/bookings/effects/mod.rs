//! Booking effects: thin orchestrators over the storage port.
//!
//! Decision logic lives in `machines` and `slots::generator`; these
//! functions fetch fresh data, invoke the pure logic, persist the outcome,
//! and fire notifications. Generated slots are advisory, so every write path
//! re-checks the interval against the live booking set and surfaces
//! `SlotNoLongerAvailable` on a lost race instead of retrying.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};

use crate::common::time::{local_to_utc, parse_tz};
use crate::common::{BookingId, ClientId, ProviderId};
use crate::domains::bookings::commands::{
    CancelBookingInput, CreateBookingInput, RequestedTime, RescheduleBookingInput,
    VerifyManageTokenInput,
};
use crate::domains::bookings::machines;
use crate::domains::bookings::models::{Booking, BookingStatus};
use crate::domains::bookings::{ics, tokens};
use crate::domains::services::models::Service;
use crate::domains::slots::commands::ValidatedSlotQuery;
use crate::domains::slots::generator::{generate_slots, SlotContext};
use crate::domains::slots::models::Slot;
use crate::error::BookingError;
use crate::kernel::deps::BookingDeps;
use crate::kernel::store::InsertOutcome;

/// A created booking plus the credentials the notification channel delivers.
#[derive(Debug, Clone)]
pub struct CreatedBooking {
    pub booking: Booking,
    /// Raw manage secret; only its hash is persisted.
    pub manage_secret: String,
    pub manage_url: String,
}

/// Outcome of a persisted reschedule.
#[derive(Debug, Clone)]
pub struct RescheduledBooking {
    pub original: Booking,
    pub replacement: Booking,
    pub manage_secret: String,
    pub manage_url: String,
}

/// Fetch window for a single target date, padded a day on each side so zone
/// offsets never clip a relevant booking.
fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    (midnight - Duration::days(1), midnight + Duration::days(2))
}

async fn slot_context(
    query: &ValidatedSlotQuery,
    deps: &BookingDeps,
) -> Result<SlotContext, BookingError> {
    let availability = deps
        .store
        .availability_for_provider(query.provider_id)
        .await?;
    let time_off = deps.store.time_off_for_provider(query.provider_id).await?;
    let service = match query.service_id {
        Some(id) => deps.store.find_service(id).await?,
        None => None,
    };
    let (from, to) = day_window(query.date);
    let bookings = deps
        .store
        .active_bookings(query.provider_id, from, to)
        .await?;
    Ok(SlotContext {
        availability,
        time_off,
        bookings,
        service,
        now: Utc::now(),
    })
}

/// Generate the bookable slots for a provider+date, against live data.
pub async fn available_slots(
    input: crate::domains::slots::commands::SlotQueryInput,
    deps: &BookingDeps,
) -> Result<Vec<Slot>, BookingError> {
    let query = input.validate()?;
    let ctx = slot_context(&query, deps).await?;
    Ok(generate_slots(&query, &ctx))
}

/// Resolve the requested time shape to concrete UTC instants.
///
/// A local (date, time) pair is interpreted in the zone of the provider's
/// availability for that weekday; duration comes from the service when one
/// is attached, else the availability row's granularity.
async fn resolve_interval(
    provider_id: ProviderId,
    requested: &RequestedTime,
    service: Option<&Service>,
    deps: &BookingDeps,
) -> Result<(DateTime<Utc>, DateTime<Utc>), BookingError> {
    match requested {
        RequestedTime::Instants { starts_at, ends_at } => Ok((*starts_at, *ends_at)),
        RequestedTime::Local { date, time } => {
            let availability = deps.store.availability_for_provider(provider_id).await?;
            let row = availability
                .iter()
                .filter(|a| a.is_available && a.day_of_week == date.weekday())
                .find(|a| a.start_time <= *time && *time < a.end_time)
                .ok_or(BookingError::SlotNoLongerAvailable)?;
            let tz = parse_tz(&row.timezone)
                .map_err(|_| BookingError::field("timezone", "availability zone is invalid"))?;
            let starts_at =
                local_to_utc(*date, *time, tz).ok_or(BookingError::SlotNoLongerAvailable)?;
            let duration_minutes = service
                .map(|s| s.duration_minutes)
                .unwrap_or(row.slot_minutes) as i64;
            Ok((starts_at, starts_at + Duration::minutes(duration_minutes)))
        }
    }
}

/// Create a booking in `pending` state, the only entry point into the
/// lifecycle. Issues a manage token for unauthenticated self-service.
pub async fn create_booking(
    input: CreateBookingInput,
    deps: &BookingDeps,
) -> Result<CreatedBooking, BookingError> {
    let validated = input.validate()?;
    let now = Utc::now();

    let service = match validated.service_id {
        Some(id) => Some(
            deps.store
                .find_service(id)
                .await?
                .ok_or_else(|| BookingError::field("service_id", "unknown service"))?,
        ),
        None => None,
    };

    let (starts_at, ends_at) = resolve_interval(
        validated.provider_id,
        &validated.requested,
        service.as_ref(),
        deps,
    )
    .await?;

    // Advisory pre-check; the store's conditional insert is the arbiter.
    let (from, to) = day_window(starts_at.date_naive());
    let holding = deps
        .store
        .active_bookings(validated.provider_id, from, to)
        .await?;
    if holding.iter().any(|b| b.overlaps(starts_at, ends_at)) {
        return Err(BookingError::SlotNoLongerAvailable);
    }

    let token = tokens::issue(starts_at, now, deps.config.manage_token_ttl_hours);

    let mut booking = Booking {
        id: BookingId::new(),
        client_id: validated.client_id.unwrap_or_else(ClientId::new),
        provider_id: validated.provider_id,
        service_id: validated.service_id,
        client_name: validated.client_name,
        client_email: validated.client_email,
        client_phone: validated.client_phone,
        date: starts_at.date_naive(),
        time: starts_at.time(),
        starts_at,
        ends_at,
        status: BookingStatus::Pending,
        source: validated.source,
        note: validated.note,
        metadata: validated.metadata,
        confirmation_sent_at: None,
        reminder_sent_at: None,
        ics_sequence: 0,
        manage_token_hash: Some(token.hash.clone()),
        manage_token_expires_at: Some(token.expires_at),
        cancellation_reason: None,
        rescheduled_from_id: None,
        created_at: now,
        updated_at: now,
    };
    booking.sync_calendar_fields();

    match deps.store.insert_if_free(&booking).await? {
        InsertOutcome::Inserted => {}
        InsertOutcome::Conflict => {
            warn!(
                provider_id = %booking.provider_id,
                starts_at = %booking.starts_at,
                "booking creation lost the slot race"
            );
            return Err(BookingError::SlotNoLongerAvailable);
        }
    }

    let manage_url =
        tokens::manage_url(&deps.config.manage_url_base, booking.id, &token.secret)
            .map_err(|e| BookingError::Store(e.into()))?;

    info!(booking_id = %booking.id, provider_id = %booking.provider_id, "booking created");
    deps.notifier.booking_created(&booking, &manage_url).await;

    Ok(CreatedBooking {
        booking,
        manage_secret: token.secret,
        manage_url,
    })
}

/// `pending` → `confirmed` (provider or automation accepting the request).
pub async fn confirm_booking(
    booking_id: BookingId,
    deps: &BookingDeps,
) -> Result<Booking, BookingError> {
    let booking = deps
        .store
        .find_booking(booking_id)
        .await?
        .ok_or(BookingError::NotFound)?;
    let confirmed = machines::confirm(&booking, Utc::now())?;
    deps.store.update_booking(&confirmed).await?;
    info!(booking_id = %confirmed.id, "booking confirmed");
    deps.notifier.booking_confirmed(&confirmed).await;
    Ok(confirmed)
}

/// Cancel via manage token, inside the cancellation window.
pub async fn cancel_booking(
    input: CancelBookingInput,
    deps: &BookingDeps,
) -> Result<Booking, BookingError> {
    let validated = input.validate()?;
    let now = Utc::now();
    // Unknown booking and bad token look identical to the caller.
    let booking = deps
        .store
        .find_booking(validated.booking_id)
        .await?
        .ok_or(BookingError::TokenInvalid)?;
    if !tokens::verify(&booking, &validated.token, now) {
        return Err(BookingError::TokenInvalid);
    }
    let cancelled = machines::cancel(&booking, validated.reason, now)?;
    deps.store.update_booking(&cancelled).await?;
    info!(booking_id = %cancelled.id, reason = cancelled.cancellation_reason.map(|r| r.as_str()), "booking cancelled");
    deps.notifier.booking_cancelled(&cancelled).await;
    Ok(cancelled)
}

/// Reschedule via manage token: validates the target against freshly
/// generated slots, freezes the original, and creates the replacement.
pub async fn reschedule_booking(
    input: RescheduleBookingInput,
    deps: &BookingDeps,
) -> Result<RescheduledBooking, BookingError> {
    let validated = input.validate()?;
    let now = Utc::now();
    let booking = deps
        .store
        .find_booking(validated.booking_id)
        .await?
        .ok_or(BookingError::TokenInvalid)?;
    if !tokens::verify(&booking, &validated.token, now) {
        return Err(BookingError::TokenInvalid);
    }

    let new_starts_at = validated.starts_at;
    let new_ends_at = match validated.ends_at {
        Some(e) => e,
        // Carry the original duration when the caller leaves the end open.
        None => new_starts_at + (booking.ends_at - booking.starts_at),
    };

    // The target must be a slot the generator would offer right now. The
    // original is excluded from the context: it releases its interval in the
    // same atomic step that creates the replacement.
    let query = ValidatedSlotQuery {
        provider_id: booking.provider_id,
        service_id: booking.service_id,
        date: new_starts_at.date_naive(),
        timezone: None,
    };
    let mut ctx = slot_context(&query, deps).await?;
    ctx.bookings.retain(|b| b.id != booking.id);
    let offered = generate_slots(&query, &ctx);
    if !offered.iter().any(|s| s.starts_at == new_starts_at) {
        return Err(BookingError::SlotNoLongerAvailable);
    }

    let outcome = machines::reschedule(&booking, new_starts_at, new_ends_at, now)?;
    let mut replacement = outcome.replacement;
    let token = tokens::issue(replacement.starts_at, now, deps.config.manage_token_ttl_hours);
    replacement.manage_token_hash = Some(token.hash.clone());
    replacement.manage_token_expires_at = Some(token.expires_at);

    match deps
        .store
        .reschedule_pair(&outcome.original, &replacement)
        .await?
    {
        InsertOutcome::Inserted => {}
        InsertOutcome::Conflict => {
            warn!(
                booking_id = %booking.id,
                starts_at = %replacement.starts_at,
                "reschedule lost the slot race"
            );
            return Err(BookingError::SlotNoLongerAvailable);
        }
    }

    let manage_url =
        tokens::manage_url(&deps.config.manage_url_base, replacement.id, &token.secret)
            .map_err(|e| BookingError::Store(e.into()))?;

    info!(
        original_id = %outcome.original.id,
        replacement_id = %replacement.id,
        "booking rescheduled"
    );
    deps.notifier
        .booking_rescheduled(&outcome.original, &replacement)
        .await;

    Ok(RescheduledBooking {
        original: outcome.original,
        replacement,
        manage_secret: token.secret,
        manage_url,
    })
}

/// `confirmed` → `completed` once the appointment has ended; the scheduler
/// that calls this lives outside the core.
pub async fn complete_booking(
    booking_id: BookingId,
    deps: &BookingDeps,
) -> Result<Booking, BookingError> {
    let booking = deps
        .store
        .find_booking(booking_id)
        .await?
        .ok_or(BookingError::NotFound)?;
    let completed = machines::complete(&booking, Utc::now())?;
    deps.store.update_booking(&completed).await?;
    info!(booking_id = %completed.id, "booking completed");
    Ok(completed)
}

/// Verify a manage token. Every failure mode collapses to `false`.
pub async fn verify_manage_token(
    input: VerifyManageTokenInput,
    deps: &BookingDeps,
) -> Result<bool, BookingError> {
    let Ok(validated) = input.validate() else {
        return Ok(false);
    };
    let Some(booking) = deps.store.find_booking(validated.booking_id).await? else {
        return Ok(false);
    };
    Ok(tokens::verify(&booking, &validated.token, Utc::now()))
}

/// Render the ICS artifact (and filename) for a booking in its current
/// state: CANCEL for cancelled bookings, REQUEST otherwise.
pub async fn export_ics(
    booking_id: BookingId,
    deps: &BookingDeps,
) -> Result<(String, String), BookingError> {
    let booking = deps
        .store
        .find_booking(booking_id)
        .await?
        .ok_or(BookingError::NotFound)?;
    let service = match booking.service_id {
        Some(id) => deps.store.find_service(id).await?,
        None => None,
    };
    let method = if booking.status == BookingStatus::Cancelled {
        ics::IcsMethod::Cancel
    } else {
        ics::IcsMethod::Request
    };
    let artifact = ics::render(&booking, service.as_ref(), method);
    let name = ics::filename(&booking, service.as_ref());
    Ok((name, artifact))
}
