use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Booking core configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Base URL manage links are built against, e.g. `https://glossbook.app`.
    pub manage_url_base: String,
    /// Manage-token lifetime in hours (capped at the appointment start).
    pub manage_token_ttl_hours: i64,
}

impl BookingConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            manage_url_base: env::var("BOOKING_MANAGE_URL_BASE")
                .context("BOOKING_MANAGE_URL_BASE must be set")?,
            manage_token_ttl_hours: env::var("BOOKING_MANAGE_TOKEN_TTL_HOURS")
                .unwrap_or_else(|_| "72".to_string())
                .parse()
                .context("BOOKING_MANAGE_TOKEN_TTL_HOURS must be a valid number")?,
        })
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            manage_url_base: "https://glossbook.app".to_string(),
            manage_token_ttl_hours: 72,
        }
    }
}
