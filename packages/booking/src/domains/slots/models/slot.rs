use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ProviderId, ServiceId};

/// A derived candidate booking interval.
///
/// Slots are computed on demand and never persisted; their validity is only
/// as fresh as the moment they were generated. Booking creation re-checks
/// the interval against the live booking set rather than trusting a slot a
/// client is holding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub provider_id: ProviderId,
    pub service_id: Option<ServiceId>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub available: bool,
}
