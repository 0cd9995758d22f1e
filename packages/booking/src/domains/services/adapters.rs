//! Legacy view adapters.
//!
//! Older dashboard screens still consume the pre-unification field names
//! (`name` instead of `title`, `is_active` instead of `is_visible`). These
//! adapters are pure and lossless for the fields they touch; they exist so
//! the domain model can move on without breaking those screens.

use rust_decimal::Decimal;
use serde::Serialize;

use super::models::Service;
use crate::common::{ProviderId, ServiceId};

/// Service as the legacy provider dashboard expects it.
#[derive(Debug, Clone, Serialize)]
pub struct LegacyServiceView {
    pub id: ServiceId,
    pub provider_id: ProviderId,
    /// Alias of `Service::title`.
    pub name: String,
    pub duration_minutes: i32,
    pub price: Decimal,
    /// Alias of `Service::is_visible`.
    pub is_active: bool,
    pub image_url: Option<String>,
}

impl From<&Service> for LegacyServiceView {
    fn from(service: &Service) -> Self {
        LegacyServiceView {
            id: service.id,
            provider_id: service.provider_id,
            name: service.title.clone(),
            duration_minutes: service.duration_minutes,
            price: service.price,
            is_active: service.is_visible,
            image_url: service.image_url.clone(),
        }
    }
}
