//! Integration tests for slot queries through the effects layer.
//!
//! Scenario shared by most tests: Monday 09:00-12:00 UTC availability with a
//! 30-minute granularity, 15-minute buffer, and a 60-minute service. Valid
//! starts are 09:00, 09:30, 10:00, 10:30 and 11:00 (an 11:00 start ends
//! exactly at window close).

mod common;

use crate::common::{at, booking_at, day_off, harness, haircut, monday_availability};
use booking_core::domains::bookings::effects;
use booking_core::domains::bookings::models::BookingStatus;
use booking_core::domains::slots::SlotQueryInput;
use booking_core::error::BookingError;

fn query(provider_id: &str, service_id: Option<String>, date: chrono::NaiveDate) -> SlotQueryInput {
    SlotQueryInput {
        provider_id: provider_id.to_string(),
        service_id,
        date: date.format("%Y-%m-%d").to_string(),
        timezone: None,
    }
}

#[tokio::test]
async fn open_day_offers_every_fitting_start() {
    let ctx = harness();
    let availability = monday_availability(booking_core::common::ProviderId::new());
    let provider_id = availability.provider_id;
    let service = haircut(provider_id);
    let service_id = service.id;
    ctx.store.seed_availability(availability);
    ctx.store.seed_service(service);

    let date = common::target_monday();
    let slots = effects::available_slots(
        query(&provider_id.to_string(), Some(service_id.to_string()), date),
        &ctx.deps,
    )
    .await
    .unwrap();

    let starts: Vec<_> = slots.iter().map(|s| s.starts_at).collect();
    assert_eq!(
        starts,
        vec![
            at(date, 9, 0),
            at(date, 9, 30),
            at(date, 10, 0),
            at(date, 10, 30),
            at(date, 11, 0),
        ]
    );
    // Service duration drives the ends, not the granularity
    assert_eq!(slots[0].ends_at, at(date, 10, 0));
    assert!(slots.iter().all(|s| s.available));
}

#[tokio::test]
async fn existing_booking_blocks_overlap_and_buffer() {
    let ctx = harness();
    let availability = monday_availability(booking_core::common::ProviderId::new());
    let provider_id = availability.provider_id;
    let service = haircut(provider_id);
    let service_id = service.id;
    ctx.store.seed_availability(availability);
    ctx.store.seed_service(service);

    let date = common::target_monday();
    // 09:00-10:00 is taken
    ctx.store.seed_booking(booking_at(
        provider_id,
        Some(service_id),
        at(date, 9, 0),
        at(date, 10, 0),
        BookingStatus::Confirmed,
    ));

    let slots = effects::available_slots(
        query(&provider_id.to_string(), Some(service_id.to_string()), date),
        &ctx.deps,
    )
    .await
    .unwrap();

    // 09:00/09:30 overlap; 10:00 violates the 15-minute buffer; the first
    // bookable start is 10:30
    let starts: Vec<_> = slots.iter().map(|s| s.starts_at).collect();
    assert_eq!(starts, vec![at(date, 10, 30), at(date, 11, 0)]);
}

#[tokio::test]
async fn cancelled_booking_releases_its_interval() {
    let ctx = harness();
    let availability = monday_availability(booking_core::common::ProviderId::new());
    let provider_id = availability.provider_id;
    ctx.store.seed_availability(availability);

    let date = common::target_monday();
    ctx.store.seed_booking(booking_at(
        provider_id,
        None,
        at(date, 9, 0),
        at(date, 10, 0),
        BookingStatus::Cancelled,
    ));

    let slots = effects::available_slots(query(&provider_id.to_string(), None, date), &ctx.deps)
        .await
        .unwrap();

    // No service: duration falls back to the 30-minute granularity
    assert_eq!(slots.len(), 6);
    assert_eq!(slots[0].starts_at, at(date, 9, 0));
}

#[tokio::test]
async fn time_off_empties_the_day() {
    let ctx = harness();
    let availability = monday_availability(booking_core::common::ProviderId::new());
    let provider_id = availability.provider_id;
    ctx.store.seed_availability(availability);

    let date = common::target_monday();
    ctx.store.seed_time_off(day_off(provider_id, date));

    let slots = effects::available_slots(query(&provider_id.to_string(), None, date), &ctx.deps)
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn timezone_override_shifts_wall_clock_interpretation() {
    let ctx = harness();
    let availability = monday_availability(booking_core::common::ProviderId::new());
    let provider_id = availability.provider_id;
    ctx.store.seed_availability(availability);

    let date = common::target_monday();
    let mut input = query(&provider_id.to_string(), None, date);
    input.timezone = Some("America/Chicago".to_string());

    let slots = effects::available_slots(input, &ctx.deps).await.unwrap();

    // Same wall-clock walk, but 09:00 Chicago is afternoon UTC
    assert_eq!(slots.len(), 6);
    assert!(slots[0].starts_at > at(date, 9, 0));
}

#[tokio::test]
async fn malformed_query_reports_field_errors() {
    let ctx = harness();
    let input = SlotQueryInput {
        provider_id: "not-a-uuid".to_string(),
        service_id: None,
        date: "tomorrow".to_string(),
        timezone: None,
    };
    let err = effects::available_slots(input, &ctx.deps).await.unwrap_err();
    match err {
        BookingError::Validation(errors) => {
            let fields: Vec<_> = errors.fields.iter().map(|f| f.field.as_str()).collect();
            assert!(fields.contains(&"provider_id"));
            assert!(fields.contains(&"date"));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}
