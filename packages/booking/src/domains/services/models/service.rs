use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::{ProviderId, ServiceId};
use crate::error::{FieldError, ValidationErrors};

/// Shortest sellable service. Anything under this is a data-entry mistake.
pub const MIN_SERVICE_MINUTES: i32 = 5;

/// An offering a provider sells (cut, color, consultation).
///
/// Services are created and edited in the provider dashboard; the booking
/// core only reads them, mainly for `duration_minutes` during slot math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub provider_id: ProviderId,
    pub title: String,
    pub duration_minutes: i32,
    pub price: Decimal,
    pub is_visible: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted row shape for services.
///
/// Columns the dashboard has grown over the years arrive as nullable; the
/// row→domain mapping is total and never fails on a well-formed row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceRow {
    pub id: ServiceId,
    pub provider_id: ProviderId,
    pub title: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub is_visible: Option<bool>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Service {
            id: row.id,
            provider_id: row.provider_id,
            title: row.title.unwrap_or_else(|| "Untitled service".to_string()),
            duration_minutes: row.duration_minutes.unwrap_or(MIN_SERVICE_MINUTES),
            price: row.price.unwrap_or_default(),
            is_visible: row.is_visible.unwrap_or(true),
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Service {
    /// Structural validation applied at the mapping boundary.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut fields = Vec::new();
        if self.duration_minutes < MIN_SERVICE_MINUTES {
            fields.push(FieldError {
                field: "duration_minutes".to_string(),
                message: format!("must be at least {MIN_SERVICE_MINUTES} minutes"),
            });
        }
        if self.price < Decimal::ZERO {
            fields.push(FieldError {
                field: "price".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(fields))
        }
    }
}
