//! Reschedule tests: the original freezes as an audit record, the
//! replacement re-enters the lifecycle at pending, and the target must be a
//! slot the generator would offer right now.

mod common;

use chrono::{Duration, Utc};

use crate::common::{at, booking_at, harness, haircut, monday_availability, target_monday};
use booking_core::common::ProviderId;
use booking_core::domains::bookings::effects;
use booking_core::domains::bookings::models::BookingStatus;
use booking_core::domains::bookings::tokens;
use booking_core::domains::bookings::{CreateBookingInput, RescheduleBookingInput};
use booking_core::error::BookingError;
use booking_core::kernel::BookingStore;

fn rfc3339(dt: chrono::DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

async fn booked_at_nine(ctx: &common::TestHarness) -> (ProviderId, effects::CreatedBooking) {
    let availability = monday_availability(ProviderId::new());
    let provider_id = availability.provider_id;
    let service = haircut(provider_id);
    let service_id = service.id;
    ctx.store.seed_availability(availability);
    ctx.store.seed_service(service);

    let date = target_monday();
    let created = effects::create_booking(
        CreateBookingInput {
            provider_id: provider_id.to_string(),
            service_id: Some(service_id.to_string()),
            client_name: "Grace Hopper".to_string(),
            client_email: "grace@example.com".to_string(),
            starts_at: Some(rfc3339(at(date, 9, 0))),
            ends_at: Some(rfc3339(at(date, 10, 0))),
            ..Default::default()
        },
        &ctx.deps,
    )
    .await
    .unwrap();
    (provider_id, created)
}

#[tokio::test]
async fn reschedule_freezes_original_and_creates_replacement() {
    let ctx = harness();
    let (_, created) = booked_at_nine(&ctx).await;
    let date = target_monday();

    let outcome = effects::reschedule_booking(
        RescheduleBookingInput {
            booking_id: created.booking.id.to_string(),
            token: created.manage_secret.clone(),
            starts_at: rfc3339(at(date, 10, 30)),
            ends_at: None,
        },
        &ctx.deps,
    )
    .await
    .unwrap();

    assert_eq!(outcome.original.status, BookingStatus::Rescheduled);
    assert_eq!(outcome.original.ics_sequence, 1);
    assert_eq!(outcome.original.starts_at, at(date, 9, 0));

    assert_eq!(outcome.replacement.status, BookingStatus::Pending);
    assert_eq!(outcome.replacement.starts_at, at(date, 10, 30));
    // Duration carried from the original when ends_at is open
    assert_eq!(outcome.replacement.ends_at, at(date, 11, 30));
    assert_eq!(outcome.replacement.rescheduled_from_id, Some(created.booking.id));
    assert_eq!(outcome.replacement.ics_sequence, 0);

    // Fresh credentials; the original secret no longer manages anything live
    assert_ne!(outcome.manage_secret, created.manage_secret);
    assert_ne!(
        outcome.replacement.manage_token_hash,
        created.booking.manage_token_hash
    );

    // Both rows persisted
    let stored_original = ctx
        .deps
        .store
        .find_booking(created.booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_original.status, BookingStatus::Rescheduled);
    let stored_replacement = ctx
        .deps
        .store
        .find_booking(outcome.replacement.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_replacement.status, BookingStatus::Pending);
}

#[tokio::test]
async fn reschedule_target_must_be_offered() {
    let ctx = harness();
    let (provider_id, created) = booked_at_nine(&ctx).await;
    let date = target_monday();

    // Another client holds 11:00-12:00
    ctx.store.seed_booking(booking_at(
        provider_id,
        created.booking.service_id,
        at(date, 11, 0),
        at(date, 12, 0),
        BookingStatus::Confirmed,
    ));

    let err = effects::reschedule_booking(
        RescheduleBookingInput {
            booking_id: created.booking.id.to_string(),
            token: created.manage_secret.clone(),
            starts_at: rfc3339(at(date, 11, 0)),
            ends_at: None,
        },
        &ctx.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, BookingError::SlotNoLongerAvailable));

    // Off-grid times are not offered either
    let err = effects::reschedule_booking(
        RescheduleBookingInput {
            booking_id: created.booking.id.to_string(),
            token: created.manage_secret,
            starts_at: rfc3339(at(date, 10, 45)),
            ends_at: None,
        },
        &ctx.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, BookingError::SlotNoLongerAvailable));
}

#[tokio::test]
async fn reschedule_back_over_own_interval_is_allowed() {
    let ctx = harness();
    let (_, created) = booked_at_nine(&ctx).await;
    let date = target_monday();

    // 09:30 overlaps the original 09:00-10:00 hold, which is released by
    // the same atomic step
    let outcome = effects::reschedule_booking(
        RescheduleBookingInput {
            booking_id: created.booking.id.to_string(),
            token: created.manage_secret,
            starts_at: rfc3339(at(date, 9, 30)),
            ends_at: None,
        },
        &ctx.deps,
    )
    .await
    .unwrap();
    assert_eq!(outcome.replacement.starts_at, at(date, 9, 30));
}

#[tokio::test]
async fn reschedule_with_wrong_token_is_rejected() {
    let ctx = harness();
    let (_, created) = booked_at_nine(&ctx).await;
    let date = target_monday();

    let err = effects::reschedule_booking(
        RescheduleBookingInput {
            booking_id: created.booking.id.to_string(),
            token: "C".repeat(tokens::SECRET_LENGTH),
            starts_at: rfc3339(at(date, 10, 30)),
            ends_at: None,
        },
        &ctx.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, BookingError::TokenInvalid));
}

#[tokio::test]
async fn reschedule_inside_the_window_is_refused() {
    let ctx = harness();
    let availability = monday_availability(ProviderId::new());
    let provider_id = availability.provider_id;
    ctx.store.seed_availability(availability);

    // Starts in 90 minutes; rescheduling needs more than two hours of lead
    let starts = Utc::now() + Duration::minutes(90);
    let mut booking = booking_at(
        provider_id,
        None,
        starts,
        starts + Duration::minutes(30),
        BookingStatus::Confirmed,
    );
    let secret = "D".repeat(tokens::SECRET_LENGTH);
    booking.manage_token_hash = Some(tokens::hash_secret(&secret));
    booking.manage_token_expires_at = Some(starts);
    let booking_id = booking.id;
    ctx.store.seed_booking(booking);

    let date = target_monday();
    let err = effects::reschedule_booking(
        RescheduleBookingInput {
            booking_id: booking_id.to_string(),
            token: secret,
            starts_at: rfc3339(at(date, 10, 30)),
            ends_at: None,
        },
        &ctx.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition { .. }));
}
