use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ProviderId, TimeOffId};
use crate::error::{FieldError, ValidationErrors};

/// An inclusive date range during which a provider takes no bookings.
///
/// No time-of-day granularity: a time-off day suppresses every availability
/// row for that date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeOff {
    pub id: TimeOffId,
    pub provider_id: ProviderId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Persisted row shape for time off.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TimeOffRow {
    pub id: TimeOffId,
    pub provider_id: ProviderId,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TimeOffRow> for TimeOff {
    fn from(row: TimeOffRow) -> Self {
        TimeOff {
            id: row.id,
            provider_id: row.provider_id,
            start_date: row.start_date,
            // Single-day entries persist with a null end date.
            end_date: row.end_date.unwrap_or(row.start_date),
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

impl TimeOff {
    /// Does this range cover `date`? Both endpoints are inclusive.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        if self.start_date > self.end_date {
            return Err(ValidationErrors::new(vec![FieldError {
                field: "end_date".to_string(),
                message: "must not be before start_date".to_string(),
            }]));
        }
        Ok(())
    }
}
