use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::{BookingId, ClientId, ProviderId, ServiceId};
use crate::error::{FieldError, ValidationErrors};

/// Booking lifecycle status.
///
/// `Cancelled` and `Completed` are terminal. `Rescheduled` is terminal for
/// the *original* record: a reschedule never edits times in place, it creates
/// a new `Pending` booking linked via `rescheduled_from_id` and freezes the
/// original as an audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rescheduled,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rescheduled => "rescheduled",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rescheduled | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }

    /// Status-level reachability. Time-window policy (cancellation and
    /// reschedule lead times) is layered on top in `machines`.
    pub fn can_transition_to(&self, target: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, target),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Pending, Rescheduled)
                | (Confirmed, Cancelled)
                | (Confirmed, Rescheduled)
                | (Confirmed, Completed)
        )
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "rescheduled" => Ok(BookingStatus::Rescheduled),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which channel a booking came in through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    #[default]
    Web,
    Hubspot,
    Manual,
}

impl BookingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingSource::Web => "web",
            BookingSource::Hubspot => "hubspot",
            BookingSource::Manual => "manual",
        }
    }
}

impl FromStr for BookingSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(BookingSource::Web),
            "hubspot" => Ok(BookingSource::Hubspot),
            "manual" => Ok(BookingSource::Manual),
            other => Err(format!("unknown booking source: {other}")),
        }
    }
}

/// Closed set of cancellation reasons the cancel form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationReason {
    ScheduleConflict,
    NoLongerNeeded,
    FoundAlternative,
    PersonalEmergency,
    Other,
}

impl CancellationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancellationReason::ScheduleConflict => "schedule_conflict",
            CancellationReason::NoLongerNeeded => "no_longer_needed",
            CancellationReason::FoundAlternative => "found_alternative",
            CancellationReason::PersonalEmergency => "personal_emergency",
            CancellationReason::Other => "other",
        }
    }
}

impl FromStr for CancellationReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "schedule_conflict" => Ok(CancellationReason::ScheduleConflict),
            "no_longer_needed" => Ok(CancellationReason::NoLongerNeeded),
            "found_alternative" => Ok(CancellationReason::FoundAlternative),
            "personal_emergency" => Ok(CancellationReason::PersonalEmergency),
            "other" => Ok(CancellationReason::Other),
            other => Err(format!("unknown cancellation reason: {other}")),
        }
    }
}

/// The central mutable entity of the booking core.
///
/// Instants are UTC; `date`/`time` are the denormalized UTC calendar fields
/// kept consistent with `starts_at` for UI that reads them directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub client_id: ClientId,
    pub provider_id: ProviderId,
    pub service_id: Option<ServiceId>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub source: BookingSource,
    pub note: Option<String>,
    /// Opaque passthrough for legacy/unknown columns; never interpreted here.
    pub metadata: serde_json::Value,
    pub confirmation_sent_at: Option<DateTime<Utc>>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    /// Bumped on every user-visible change so calendar clients update in
    /// place instead of duplicating the event.
    pub ics_sequence: i32,
    pub manage_token_hash: Option<String>,
    pub manage_token_expires_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<CancellationReason>,
    pub rescheduled_from_id: Option<BookingId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Interval overlap against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.starts_at < end && start < self.ends_at
    }

    /// Does this booking still hold its interval against new candidates?
    ///
    /// Cancelled bookings release the slot, and so do rescheduled originals:
    /// the replacement row is the one holding the new interval.
    pub fn blocks_slot(&self) -> bool {
        matches!(
            self.status,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Completed
        )
    }

    /// Re-derive `date`/`time` from `starts_at` (UTC calendar fields).
    pub fn sync_calendar_fields(&mut self) {
        self.date = self.starts_at.date_naive();
        self.time = self.starts_at.time();
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut fields = Vec::new();
        if self.ends_at <= self.starts_at {
            fields.push(FieldError {
                field: "ends_at".to_string(),
                message: "must be after starts_at".to_string(),
            });
        }
        if self.date != self.starts_at.date_naive() || self.time != self.starts_at.time() {
            fields.push(FieldError {
                field: "date".to_string(),
                message: "date/time must match starts_at".to_string(),
            });
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(fields))
        }
    }
}

/// Persisted row shape for bookings. Enums travel as text and are decoded in
/// the row→domain mapping so schema drift surfaces in exactly one place.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookingRow {
    pub id: BookingId,
    pub client_id: ClientId,
    pub provider_id: ProviderId,
    pub service_id: Option<ServiceId>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: String,
    pub source: Option<String>,
    pub note: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub confirmation_sent_at: Option<DateTime<Utc>>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub ics_sequence: Option<i32>,
    pub manage_token_hash: Option<String>,
    pub manage_token_expires_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub rescheduled_from_id: Option<BookingId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = ValidationErrors;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<BookingStatus>().map_err(|message| {
            ValidationErrors::new(vec![FieldError {
                field: "status".to_string(),
                message,
            }])
        })?;
        // Unknown source channels degrade to web rather than failing reads.
        let source = row
            .source
            .as_deref()
            .and_then(|s| s.parse::<BookingSource>().ok())
            .unwrap_or_default();
        let cancellation_reason = row
            .cancellation_reason
            .as_deref()
            .and_then(|s| s.parse::<CancellationReason>().ok());

        let mut booking = Booking {
            id: row.id,
            client_id: row.client_id,
            provider_id: row.provider_id,
            service_id: row.service_id,
            client_name: row.client_name.unwrap_or_default(),
            client_email: row.client_email.unwrap_or_default(),
            client_phone: row.client_phone,
            date: row.starts_at.date_naive(),
            time: row.starts_at.time(),
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            status,
            source,
            note: row.note,
            metadata: row.metadata.unwrap_or(serde_json::Value::Null),
            confirmation_sent_at: row.confirmation_sent_at,
            reminder_sent_at: row.reminder_sent_at,
            ics_sequence: row.ics_sequence.unwrap_or(0),
            manage_token_hash: row.manage_token_hash,
            manage_token_expires_at: row.manage_token_expires_at,
            cancellation_reason,
            rescheduled_from_id: row.rescheduled_from_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        booking.sync_calendar_fields();
        Ok(booking)
    }
}

impl From<&Booking> for BookingRow {
    fn from(booking: &Booking) -> Self {
        BookingRow {
            id: booking.id,
            client_id: booking.client_id,
            provider_id: booking.provider_id,
            service_id: booking.service_id,
            client_name: Some(booking.client_name.clone()),
            client_email: Some(booking.client_email.clone()),
            client_phone: booking.client_phone.clone(),
            starts_at: booking.starts_at,
            ends_at: booking.ends_at,
            status: booking.status.as_str().to_string(),
            source: Some(booking.source.as_str().to_string()),
            note: booking.note.clone(),
            metadata: match &booking.metadata {
                serde_json::Value::Null => None,
                other => Some(other.clone()),
            },
            confirmation_sent_at: booking.confirmation_sent_at,
            reminder_sent_at: booking.reminder_sent_at,
            ics_sequence: Some(booking.ics_sequence),
            manage_token_hash: booking.manage_token_hash.clone(),
            manage_token_expires_at: booking.manage_token_expires_at,
            cancellation_reason: booking.cancellation_reason.map(|r| r.as_str().to_string()),
            rescheduled_from_id: booking.rescheduled_from_id,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn row() -> BookingRow {
        BookingRow {
            id: BookingId::new(),
            client_id: ClientId::new(),
            provider_id: ProviderId::new(),
            service_id: Some(ServiceId::new()),
            client_name: Some("Ada".to_string()),
            client_email: Some("ada@example.com".to_string()),
            client_phone: None,
            starts_at: utc(2025, 6, 2, 14, 0),
            ends_at: utc(2025, 6, 2, 15, 0),
            status: "pending".to_string(),
            source: None,
            note: None,
            metadata: Some(serde_json::json!({"legacy_field": 7})),
            confirmation_sent_at: None,
            reminder_sent_at: None,
            ics_sequence: None,
            manage_token_hash: None,
            manage_token_expires_at: None,
            cancellation_reason: None,
            rescheduled_from_id: None,
            created_at: utc(2025, 6, 1, 0, 0),
            updated_at: utc(2025, 6, 1, 0, 0),
        }
    }

    #[test]
    fn test_row_mapping_defaults_and_passthrough() {
        let booking = Booking::try_from(row()).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.source, BookingSource::Web);
        assert_eq!(booking.ics_sequence, 0);
        assert_eq!(booking.date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(booking.time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        // Unknown legacy fields ride along untouched
        assert_eq!(booking.metadata["legacy_field"], 7);
    }

    #[test]
    fn test_row_mapping_rejects_unknown_status() {
        let mut r = row();
        r.status = "archived".to_string();
        assert!(Booking::try_from(r).is_err());
    }

    #[test]
    fn test_overlap_is_half_open() {
        let booking = Booking::try_from(row()).unwrap();
        // Touching intervals do not overlap
        assert!(!booking.overlaps(utc(2025, 6, 2, 15, 0), utc(2025, 6, 2, 16, 0)));
        assert!(!booking.overlaps(utc(2025, 6, 2, 13, 0), utc(2025, 6, 2, 14, 0)));
        // Any shared instant in the interior does
        assert!(booking.overlaps(utc(2025, 6, 2, 14, 30), utc(2025, 6, 2, 15, 30)));
        assert!(booking.overlaps(utc(2025, 6, 2, 13, 0), utc(2025, 6, 2, 16, 0)));
    }

    #[test]
    fn test_blocks_slot_per_status() {
        let mut booking = Booking::try_from(row()).unwrap();
        for (status, blocks) in [
            (BookingStatus::Pending, true),
            (BookingStatus::Confirmed, true),
            (BookingStatus::Completed, true),
            (BookingStatus::Cancelled, false),
            (BookingStatus::Rescheduled, false),
        ] {
            booking.status = status;
            assert_eq!(booking.blocks_slot(), blocks, "{status}");
        }
    }

    #[test]
    fn test_reachability_matrix() {
        use BookingStatus::*;
        let all = [Pending, Confirmed, Rescheduled, Cancelled, Completed];
        let legal = [
            (Pending, Confirmed),
            (Pending, Cancelled),
            (Pending, Rescheduled),
            (Confirmed, Cancelled),
            (Confirmed, Rescheduled),
            (Confirmed, Completed),
        ];
        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
            assert!(from.is_terminal() == !all.iter().any(|to| from.can_transition_to(*to)));
        }
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Rescheduled,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
    }
}
