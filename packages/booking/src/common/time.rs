//! Wall-clock to UTC conversion.
//!
//! Availability rows carry local wall-clock times plus an IANA zone; all
//! booking instants are stored and compared in UTC. This module is the only
//! place that conversion happens, and it takes the zone explicitly; there is
//! no ambient default zone anywhere in the crate.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse an IANA zone name (e.g. `America/Chicago`).
pub fn parse_tz(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>()
        .map_err(|_| format!("unknown IANA time zone: {name}"))
}

/// Resolve a local wall-clock (date, time) in `tz` to a UTC instant.
///
/// DST handling: an ambiguous local time (clocks rolled back) maps to the
/// earlier of the two instants; a nonexistent local time (clocks sprang
/// forward) yields `None` and the caller skips that candidate.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// The current date as seen from `tz`.
pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}
