//! Mutating-operation inputs and their validators.
//!
//! Inputs arrive as raw strings from the web wizard and are normalized here
//! before any state is touched. Validators are pure and report every violated
//! field, so the form can highlight all of them in one round trip.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::common::validate::FieldChecker;
use crate::common::{BookingId, ClientId, ProviderId, ServiceId};
use crate::domains::bookings::models::{BookingSource, CancellationReason};
use crate::error::ValidationErrors;

/// When the client wants the appointment, in whichever shape the wizard
/// collected it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedTime {
    /// Precise UTC instants.
    Instants {
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
    /// Local wall-clock (date, time); the effects layer resolves it against
    /// the provider's availability zone and the service duration.
    Local { date: NaiveDate, time: NaiveTime },
}

// ============================================================================
// Create booking
// ============================================================================

/// Raw create-booking request as submitted by the wizard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBookingInput {
    pub provider_id: String,
    /// Absent for guest checkout; a client record is minted downstream.
    pub client_id: Option<String>,
    pub service_id: Option<String>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub source: Option<String>,
    pub note: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Normalized create-booking request.
#[derive(Debug, Clone)]
pub struct ValidatedCreateBooking {
    pub provider_id: ProviderId,
    pub client_id: Option<ClientId>,
    pub service_id: Option<ServiceId>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub requested: RequestedTime,
    pub source: BookingSource,
    pub note: Option<String>,
    pub metadata: serde_json::Value,
}

impl CreateBookingInput {
    pub fn validate(self) -> Result<ValidatedCreateBooking, ValidationErrors> {
        let mut check = FieldChecker::new();

        let provider_id = check.id("provider_id", &self.provider_id);
        let client_id = self
            .client_id
            .as_deref()
            .and_then(|raw| check.id("client_id", raw));
        let service_id = self
            .service_id
            .as_deref()
            .and_then(|raw| check.id("service_id", raw));
        let client_name = check.non_empty("client_name", &self.client_name);
        let client_email = check.email("client_email", &self.client_email);

        let requested = match (&self.starts_at, &self.ends_at, &self.date, &self.time) {
            (Some(starts_raw), Some(ends_raw), _, _) => {
                let starts_at = check.instant("starts_at", starts_raw);
                let ends_at = check.instant("ends_at", ends_raw);
                match (starts_at, ends_at) {
                    (Some(s), Some(e)) if e <= s => {
                        check.fail("ends_at", "must be after starts_at");
                        None
                    }
                    (Some(s), Some(e)) => Some(RequestedTime::Instants {
                        starts_at: s,
                        ends_at: e,
                    }),
                    _ => None,
                }
            }
            (None, None, Some(date_raw), Some(time_raw)) => {
                let date = check.date("date", date_raw);
                let time = match NaiveTime::parse_from_str(time_raw, "%H:%M") {
                    Ok(t) => Some(t),
                    Err(_) => {
                        check.fail("time", "must be an HH:MM wall-clock time");
                        None
                    }
                };
                match (date, time) {
                    (Some(date), Some(time)) => Some(RequestedTime::Local { date, time }),
                    _ => None,
                }
            }
            _ => {
                check.fail(
                    "starts_at",
                    "either starts_at/ends_at or date/time must be provided",
                );
                None
            }
        };

        // Source defaults to web; an unknown channel is an input error, not a
        // silent default.
        let source = match self.source.as_deref() {
            None | Some("") => Some(BookingSource::default()),
            Some(raw) => match raw.parse::<BookingSource>() {
                Ok(source) => Some(source),
                Err(_) => {
                    check.fail("source", "must be one of: web, hubspot, manual");
                    None
                }
            },
        };

        let errors = check.finish();
        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors));
        }

        Ok(ValidatedCreateBooking {
            provider_id: provider_id.expect("checked"),
            client_id,
            service_id,
            client_name: client_name.expect("checked"),
            client_email: client_email.expect("checked"),
            client_phone: self.client_phone.filter(|p| !p.trim().is_empty()),
            requested: requested.expect("checked"),
            source: source.expect("checked"),
            note: self.note.filter(|n| !n.trim().is_empty()),
            metadata: self.metadata.unwrap_or(serde_json::Value::Null),
        })
    }
}

// ============================================================================
// Reschedule booking
// ============================================================================

/// Raw reschedule request, authorized by a manage token.
#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleBookingInput {
    pub booking_id: String,
    pub token: String,
    pub starts_at: String,
    /// Absent when the service duration should determine the end.
    pub ends_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedReschedule {
    pub booking_id: BookingId,
    pub token: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl RescheduleBookingInput {
    pub fn validate(self) -> Result<ValidatedReschedule, ValidationErrors> {
        let mut check = FieldChecker::new();
        let booking_id = check.id("booking_id", &self.booking_id);
        if self.token.is_empty() {
            check.fail("token", "must not be empty");
        }
        let starts_at = check.instant("starts_at", &self.starts_at);
        let ends_at = match self.ends_at.as_deref() {
            Some(raw) => match check.instant("ends_at", raw) {
                Some(e) => {
                    if let Some(s) = starts_at {
                        if e <= s {
                            check.fail("ends_at", "must be after starts_at");
                        }
                    }
                    Some(e)
                }
                None => None,
            },
            None => None,
        };

        let errors = check.finish();
        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors));
        }
        Ok(ValidatedReschedule {
            booking_id: booking_id.expect("checked"),
            token: self.token,
            starts_at: starts_at.expect("checked"),
            ends_at,
        })
    }
}

// ============================================================================
// Cancel booking
// ============================================================================

/// Raw cancel request, authorized by a manage token.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelBookingInput {
    pub booking_id: String,
    pub token: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedCancel {
    pub booking_id: BookingId,
    pub token: String,
    pub reason: CancellationReason,
}

impl CancelBookingInput {
    pub fn validate(self) -> Result<ValidatedCancel, ValidationErrors> {
        let mut check = FieldChecker::new();
        let booking_id = check.id("booking_id", &self.booking_id);
        if self.token.is_empty() {
            check.fail("token", "must not be empty");
        }
        let reason = match self.reason.as_deref() {
            None | Some("") => {
                check.fail(
                    "reason",
                    "must be one of: schedule_conflict, no_longer_needed, \
                     found_alternative, personal_emergency, other",
                );
                None
            }
            Some(raw) => match raw.parse::<CancellationReason>() {
                Ok(reason) => Some(reason),
                Err(_) => {
                    check.fail(
                        "reason",
                        "must be one of: schedule_conflict, no_longer_needed, \
                         found_alternative, personal_emergency, other",
                    );
                    None
                }
            },
        };

        let errors = check.finish();
        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors));
        }
        Ok(ValidatedCancel {
            booking_id: booking_id.expect("checked"),
            token: self.token,
            reason: reason.expect("checked"),
        })
    }
}

// ============================================================================
// Verify manage token
// ============================================================================

/// Raw token-verification request (the manage page's first call).
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyManageTokenInput {
    pub booking_id: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct ValidatedVerifyToken {
    pub booking_id: BookingId,
    pub token: String,
}

impl VerifyManageTokenInput {
    pub fn validate(self) -> Result<ValidatedVerifyToken, ValidationErrors> {
        let mut check = FieldChecker::new();
        let booking_id = check.id("booking_id", &self.booking_id);
        if self.token.is_empty() {
            check.fail("token", "must not be empty");
        }
        let errors = check.finish();
        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors));
        }
        Ok(ValidatedVerifyToken {
            booking_id: booking_id.expect("checked"),
            token: self.token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_input() -> CreateBookingInput {
        CreateBookingInput {
            provider_id: ProviderId::new().to_string(),
            client_id: None,
            service_id: Some(ServiceId::new().to_string()),
            client_name: "Ada Lovelace".to_string(),
            client_email: "ada@example.com".to_string(),
            client_phone: Some("+15551234567".to_string()),
            starts_at: Some("2025-06-02T14:00:00Z".to_string()),
            ends_at: Some("2025-06-02T15:00:00Z".to_string()),
            date: None,
            time: None,
            source: None,
            note: Some("first visit".to_string()),
            metadata: None,
        }
    }

    #[test]
    fn test_create_happy_path_defaults_source_to_web() {
        let validated = create_input().validate().unwrap();
        assert_eq!(validated.source, BookingSource::Web);
        assert!(matches!(validated.requested, RequestedTime::Instants { .. }));
        assert_eq!(validated.note.as_deref(), Some("first visit"));
    }

    #[test]
    fn test_create_accepts_local_date_time_pair() {
        let mut input = create_input();
        input.starts_at = None;
        input.ends_at = None;
        input.date = Some("2025-06-02".to_string());
        input.time = Some("09:30".to_string());
        let validated = input.validate().unwrap();
        assert!(matches!(validated.requested, RequestedTime::Local { .. }));
    }

    #[test]
    fn test_create_reports_every_violation() {
        let input = CreateBookingInput {
            provider_id: "nope".to_string(),
            client_name: "  ".to_string(),
            client_email: "not-an-email".to_string(),
            starts_at: Some("2025-06-02T15:00:00Z".to_string()),
            ends_at: Some("2025-06-02T14:00:00Z".to_string()),
            source: Some("carrier_pigeon".to_string()),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        let fields: Vec<_> = errors.fields.iter().map(|f| f.field.as_str()).collect();
        assert!(fields.contains(&"provider_id"));
        assert!(fields.contains(&"client_name"));
        assert!(fields.contains(&"client_email"));
        assert!(fields.contains(&"ends_at"));
        assert!(fields.contains(&"source"));
    }

    #[test]
    fn test_create_requires_some_time_shape() {
        let mut input = create_input();
        input.starts_at = None;
        input.ends_at = None;
        let errors = input.validate().unwrap_err();
        assert!(errors.fields.iter().any(|f| f.field == "starts_at"));
    }

    #[test]
    fn test_cancel_requires_closed_reason_set() {
        let base = CancelBookingInput {
            booking_id: BookingId::new().to_string(),
            token: "tok".to_string(),
            reason: Some("schedule_conflict".to_string()),
        };
        assert_eq!(
            base.clone().validate().unwrap().reason,
            CancellationReason::ScheduleConflict
        );

        let mut missing = base.clone();
        missing.reason = None;
        assert!(missing.validate().is_err());

        let mut unknown = base;
        unknown.reason = Some("rain".to_string());
        assert!(unknown.validate().is_err());
    }

    #[test]
    fn test_reschedule_validates_interval_order() {
        let input = RescheduleBookingInput {
            booking_id: BookingId::new().to_string(),
            token: "tok".to_string(),
            starts_at: "2025-06-02T15:00:00Z".to_string(),
            ends_at: Some("2025-06-02T14:00:00Z".to_string()),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.fields.iter().any(|f| f.field == "ends_at"));
    }
}
