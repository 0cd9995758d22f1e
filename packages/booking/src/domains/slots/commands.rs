//! Slot query input and validation.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::common::time::parse_tz;
use crate::common::validate::FieldChecker;
use crate::common::{ProviderId, ServiceId};
use crate::error::ValidationErrors;

/// Raw slot request from the wizard's date step.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotQueryInput {
    pub provider_id: String,
    pub service_id: Option<String>,
    /// Target date, `YYYY-MM-DD`.
    pub date: String,
    /// Optional IANA zone overriding the availability rows' own zone for the
    /// whole query (wall-clock interpretation and look-ahead window).
    pub timezone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedSlotQuery {
    pub provider_id: ProviderId,
    pub service_id: Option<ServiceId>,
    pub date: NaiveDate,
    pub timezone: Option<Tz>,
}

impl SlotQueryInput {
    pub fn validate(self) -> Result<ValidatedSlotQuery, ValidationErrors> {
        let mut check = FieldChecker::new();
        let provider_id = check.id("provider_id", &self.provider_id);
        let service_id = self
            .service_id
            .as_deref()
            .and_then(|raw| check.id("service_id", raw));
        let date = check.date("date", &self.date);
        let timezone = match self.timezone.as_deref() {
            None | Some("") => None,
            Some(raw) => match parse_tz(raw) {
                Ok(tz) => Some(tz),
                Err(_) => {
                    check.fail("timezone", "must be a known IANA zone");
                    None
                }
            },
        };

        let errors = check.finish();
        match (provider_id, date) {
            (Some(provider_id), Some(date)) if errors.is_empty() => Ok(ValidatedSlotQuery {
                provider_id,
                service_id,
                date,
                timezone,
            }),
            _ => Err(ValidationErrors::new(errors)),
        }
    }
}
