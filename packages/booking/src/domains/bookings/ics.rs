//! ICS (RFC 5545) rendering for bookings.
//!
//! Hand-rendered VCALENDAR/VEVENT text. The UID is derived from the booking
//! id and never changes across revisions; calendar clients pair it with the
//! SEQUENCE counter to update the event in place instead of duplicating it.

use chrono::{DateTime, Utc};

use crate::domains::bookings::models::{Booking, BookingStatus};
use crate::domains::services::models::Service;

/// Calendar method for the artifact being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcsMethod {
    /// Create or update an event.
    Request,
    /// Retract a previously delivered event.
    Cancel,
}

impl IcsMethod {
    fn as_str(&self) -> &'static str {
        match self {
            IcsMethod::Request => "REQUEST",
            IcsMethod::Cancel => "CANCEL",
        }
    }
}

const PRODID: &str = "-//Glossbook//Booking Core//EN";
const UID_DOMAIN: &str = "glossbook.app";
const FALLBACK_SUMMARY: &str = "Appointment";

fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// RFC 5545 TEXT escaping: backslash, semicolon, comma, newline.
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Fold a content line at 75 octets with a space continuation (RFC 5545 §3.1).
fn fold_line(line: &str) -> String {
    const LIMIT: usize = 75;
    if line.len() <= LIMIT {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / LIMIT * 3);
    let mut remaining = line;
    let mut first = true;
    while !remaining.is_empty() {
        let budget = if first { LIMIT } else { LIMIT - 1 };
        // Break on a char boundary at or below the octet budget
        let mut cut = budget.min(remaining.len());
        while !remaining.is_char_boundary(cut) {
            cut -= 1;
        }
        if !first {
            out.push_str("\r\n ");
        }
        out.push_str(&remaining[..cut]);
        remaining = &remaining[cut..];
        first = false;
    }
    out
}

/// Stable event UID for a booking, unchanged across revisions.
pub fn event_uid(booking: &Booking) -> String {
    format!("booking-{}@{}", booking.id, UID_DOMAIN)
}

/// Render a booking (and its optional service) as an ICS artifact.
pub fn render(booking: &Booking, service: Option<&Service>, method: IcsMethod) -> String {
    let summary = service
        .map(|s| s.title.as_str())
        .unwrap_or(FALLBACK_SUMMARY);

    let mut description = service
        .map(|s| s.title.clone())
        .unwrap_or_else(|| FALLBACK_SUMMARY.to_string());
    if let Some(note) = booking.note.as_deref() {
        if !note.is_empty() {
            description.push('\n');
            description.push_str(note);
        }
    }

    let status = if booking.status == BookingStatus::Cancelled {
        "CANCELLED"
    } else {
        "CONFIRMED"
    };

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        "CALSCALE:GREGORIAN".to_string(),
        format!("METHOD:{}", method.as_str()),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", event_uid(booking)),
        format!("SEQUENCE:{}", booking.ics_sequence),
        format!("DTSTAMP:{}", format_utc(booking.updated_at)),
        format!("DTSTART:{}", format_utc(booking.starts_at)),
        format!("DTEND:{}", format_utc(booking.ends_at)),
        format!("SUMMARY:{}", escape_text(summary)),
        format!("DESCRIPTION:{}", escape_text(&description)),
        format!("STATUS:{status}"),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut out = String::new();
    for line in &lines {
        out.push_str(&fold_line(line));
        out.push_str("\r\n");
    }
    out
}

/// Filesystem-safe download name: slugged service title plus booking date.
pub fn filename(booking: &Booking, service: Option<&Service>) -> String {
    let slug = service
        .map(|s| slugify(&s.title))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "appointment".to_string());
    format!("{}-{}.ics", slug, booking.date.format("%Y-%m-%d"))
}

fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_dash = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
