use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::common::time::parse_tz;
use crate::common::{AvailabilityId, ProviderId};
use crate::error::{FieldError, ValidationErrors};

pub const DEFAULT_SLOT_MINUTES: i32 = 30;
pub const DEFAULT_BUFFER_MINUTES: i32 = 15;
pub const DEFAULT_MAX_ADVANCE_DAYS: i32 = 60;
pub const MIN_SLOT_MINUTES: i32 = 5;

/// A weekly-recurring open interval for a provider.
///
/// Times are local wall-clock in the row's IANA zone; conversion to UTC
/// happens only in the slot generator. A provider may have several rows for
/// one weekday (split shifts). Rows are not guaranteed non-overlapping, so
/// the slot generator merges rather than assumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub id: AvailabilityId,
    pub provider_id: ProviderId,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
    /// IANA zone name, e.g. `America/Chicago`.
    pub timezone: String,
    /// Candidate-start granularity in minutes.
    pub slot_minutes: i32,
    /// Minimum gap after a preceding booking before a candidate is offered.
    pub buffer_minutes: i32,
    /// How far ahead of today slots may be offered.
    pub max_advance_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted row shape. `day_of_week` is 0=Sunday..6=Saturday.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AvailabilityRow {
    pub id: AvailabilityId,
    pub provider_id: ProviderId,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: Option<bool>,
    pub timezone: Option<String>,
    pub slot_minutes: Option<i32>,
    pub buffer_minutes: Option<i32>,
    pub max_advance_days: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 0=Sunday..6=Saturday, matching the persisted encoding.
pub fn weekday_from_index(index: i32) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

pub fn weekday_index(day: Weekday) -> i32 {
    day.num_days_from_sunday() as i32
}

impl From<AvailabilityRow> for Availability {
    fn from(row: AvailabilityRow) -> Self {
        Availability {
            id: row.id,
            provider_id: row.provider_id,
            // Out-of-range weekday encodings park the row on Sunday rather
            // than failing the whole mapping; validate() flags them.
            day_of_week: weekday_from_index(row.day_of_week).unwrap_or(Weekday::Sun),
            start_time: row.start_time,
            end_time: row.end_time,
            is_available: row.is_available.unwrap_or(true),
            timezone: row.timezone.unwrap_or_else(|| "UTC".to_string()),
            slot_minutes: row.slot_minutes.unwrap_or(DEFAULT_SLOT_MINUTES),
            buffer_minutes: row.buffer_minutes.unwrap_or(DEFAULT_BUFFER_MINUTES),
            max_advance_days: row.max_advance_days.unwrap_or(DEFAULT_MAX_ADVANCE_DAYS),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Availability {
    /// Structural validation applied at the mapping boundary.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut fields = Vec::new();
        if self.start_time >= self.end_time {
            fields.push(FieldError {
                field: "start_time".to_string(),
                message: "must be before end_time".to_string(),
            });
        }
        if self.slot_minutes < MIN_SLOT_MINUTES {
            fields.push(FieldError {
                field: "slot_minutes".to_string(),
                message: format!("must be at least {MIN_SLOT_MINUTES}"),
            });
        }
        if self.buffer_minutes < 0 {
            fields.push(FieldError {
                field: "buffer_minutes".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        if parse_tz(&self.timezone).is_err() {
            fields.push(FieldError {
                field: "timezone".to_string(),
                message: "must be a known IANA zone".to_string(),
            });
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(fields))
        }
    }
}
