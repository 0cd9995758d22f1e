//! Slot generation.
//!
//! Pure interval math - NO IO. The effects layer fetches everything the
//! algorithm needs (availability, time off, live bookings, the service) and
//! hands it over as a `SlotContext`; the same inputs always produce the same
//! ordered output.
//!
//! Generated slots are advisory, not reservations: only candidates that can
//! actually be booked right now are returned (all `available = true`), and
//! booking creation re-runs the overlap check against the live booking set.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use std::collections::BTreeMap;
use typed_builder::TypedBuilder;

use crate::common::time::{local_to_utc, parse_tz, today_in};
use crate::domains::availability::models::{Availability, TimeOff};
use crate::domains::bookings::models::Booking;
use crate::domains::services::models::Service;
use crate::domains::slots::commands::ValidatedSlotQuery;
use crate::domains::slots::models::Slot;

/// Everything slot generation reads, fetched immediately before use.
#[derive(Debug, Clone, TypedBuilder)]
pub struct SlotContext {
    pub availability: Vec<Availability>,
    #[builder(default)]
    pub time_off: Vec<TimeOff>,
    /// The provider's bookings around the target date; cancelled and
    /// rescheduled rows are ignored here even if the caller includes them.
    #[builder(default)]
    pub bookings: Vec<Booking>,
    #[builder(default)]
    pub service: Option<Service>,
    pub now: DateTime<Utc>,
}

/// Generate the ordered, deduplicated bookable slots for one provider+date.
pub fn generate_slots(query: &ValidatedSlotQuery, ctx: &SlotContext) -> Vec<Slot> {
    // Time off suppresses the whole day regardless of availability.
    let off = ctx
        .time_off
        .iter()
        .any(|t| t.provider_id == query.provider_id && t.covers(query.date));
    if off {
        return Vec::new();
    }

    let weekday = query.date.weekday();
    let rows: Vec<&Availability> = ctx
        .availability
        .iter()
        .filter(|a| {
            a.provider_id == query.provider_id && a.is_available && a.day_of_week == weekday
        })
        .collect();
    if rows.is_empty() {
        return Vec::new();
    }

    let blocking: Vec<&Booking> = ctx
        .bookings
        .iter()
        .filter(|b| b.provider_id == query.provider_id && b.blocks_slot())
        .collect();

    // Dedupe by start instant across overlapping rows; BTreeMap keeps the
    // ascending order the contract requires.
    let mut candidates: BTreeMap<DateTime<Utc>, Slot> = BTreeMap::new();

    for row in rows {
        let Ok(row_tz) = parse_tz(&row.timezone) else {
            // A row with a broken zone cannot be interpreted; skip it rather
            // than guess a zone for someone's calendar.
            continue;
        };
        let tz = query.timezone.unwrap_or(row_tz);

        let duration_minutes = ctx
            .service
            .as_ref()
            .map(|s| s.duration_minutes)
            .unwrap_or(row.slot_minutes) as i64;
        if duration_minutes <= 0 {
            continue;
        }
        let duration = Duration::minutes(duration_minutes);

        // Look-ahead window, evaluated against "today" in the row's zone.
        let days_ahead = (query.date - today_in(tz, ctx.now)).num_days();
        if days_ahead > row.max_advance_days as i64 {
            continue;
        }

        let window_start = row.start_time.num_seconds_from_midnight() as i64 / 60;
        let window_end = row.end_time.num_seconds_from_midnight() as i64 / 60;
        let step = row.slot_minutes.max(1) as i64;

        let mut offset = window_start;
        while offset + duration_minutes <= window_end {
            let local_time = row.start_time + Duration::minutes(offset - window_start);
            offset += step;

            // DST gap: this wall-clock never happens that day.
            let Some(starts_at) = local_to_utc(query.date, local_time, tz) else {
                continue;
            };
            let ends_at = starts_at + duration;

            // Never offer the past.
            if starts_at < ctx.now {
                continue;
            }

            // Buffer after the immediately preceding booking's end.
            let preceding_end = blocking
                .iter()
                .filter(|b| b.ends_at <= starts_at)
                .map(|b| b.ends_at)
                .max();
            if let Some(end) = preceding_end {
                if starts_at - end < Duration::minutes(row.buffer_minutes as i64) {
                    continue;
                }
            }

            // Taken intervals are absent from the output, not flagged.
            if blocking.iter().any(|b| b.overlaps(starts_at, ends_at)) {
                continue;
            }

            candidates.entry(starts_at).or_insert(Slot {
                provider_id: query.provider_id,
                service_id: query.service_id,
                starts_at,
                ends_at,
                available: true,
            });
        }
    }

    candidates.into_values().collect()
}
