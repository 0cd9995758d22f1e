//! Manage tokens: short-lived bearer secrets for unauthenticated
//! self-service on a single booking.
//!
//! Only the SHA-256 hash of the secret is ever stored; the raw secret goes
//! out once, inside the manage link. Verification is deliberately symmetric:
//! expired, mismatched, and missing all collapse to `false`, in constant
//! time, so a caller cannot probe which case occurred.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::common::BookingId;
use crate::domains::bookings::models::Booking;

/// Secret length in characters (~285 bits of alphanumeric entropy).
pub const SECRET_LENGTH: usize = 48;

/// Default token lifetime when config does not override it.
pub const DEFAULT_TTL_HOURS: i64 = 72;

/// A freshly issued token: the raw secret for out-of-band delivery plus the
/// fields the effects layer persists on the booking.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub secret: String,
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

/// SHA-256 hex digest of a secret.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue a new token for a booking starting at `starts_at`.
///
/// Expiry is `now + ttl_hours` capped at the appointment start; a manage
/// link has no business outliving the appointment it manages.
pub fn issue(starts_at: DateTime<Utc>, now: DateTime<Utc>, ttl_hours: i64) -> IssuedToken {
    let secret: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect();
    let expires_at = (now + Duration::hours(ttl_hours)).min(starts_at);
    IssuedToken {
        hash: hash_secret(&secret),
        secret,
        expires_at,
    }
}

/// Verify a presented secret against a booking's stored token fields.
///
/// The presented secret is always hashed and always compared, even when the
/// booking carries no token, to keep the timing profile flat.
pub fn verify(booking: &Booking, secret: &str, now: DateTime<Utc>) -> bool {
    let presented = hash_secret(secret);
    let stored = booking.manage_token_hash.as_deref().unwrap_or("");
    let hash_matches: bool = presented.as_bytes().ct_eq(stored.as_bytes()).into();
    let unexpired = matches!(booking.manage_token_expires_at, Some(exp) if now < exp);
    hash_matches && unexpired
}

/// Build the manage link embedding the booking id and the raw secret.
///
/// Delivery (email, SMS) happens outside the core.
pub fn manage_url(base: &str, booking_id: BookingId, secret: &str) -> Result<String, url::ParseError> {
    let mut url = url::Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::EmptyHost)?
        .extend(["bookings", &booking_id.to_string(), "manage"]);
    url.query_pairs_mut().append_pair("token", secret);
    Ok(url.to_string())
}
