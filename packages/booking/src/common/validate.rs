//! Shared field validation helpers.
//!
//! Every mutating input goes through these before any state change. They are
//! pure and collect failures per-field rather than bailing on the first one,
//! so the UI can render field-level feedback in one pass.

use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::common::Id;
use crate::error::FieldError;

lazy_static! {
    /// Pragmatic RFC5322 shape: local part, one `@`, dotted domain.
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Accumulates field errors while an input struct is checked.
#[derive(Debug, Default)]
pub struct FieldChecker {
    errors: Vec<FieldError>,
}

impl FieldChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Parse a typed ID, recording a field error on malformed input.
    pub fn id<T>(&mut self, field: &str, raw: &str) -> Option<Id<T>> {
        match Id::parse(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                self.fail(field, "must be a well-formed UUID");
                None
            }
        }
    }

    /// Parse an ISO-8601 instant, recording a field error on malformed input.
    pub fn instant(&mut self, field: &str, raw: &str) -> Option<DateTime<Utc>> {
        match raw.parse::<DateTime<Utc>>() {
            Ok(dt) => Some(dt),
            Err(_) => {
                self.fail(field, "must be an ISO-8601 instant");
                None
            }
        }
    }

    /// Parse a `%Y-%m-%d` date, recording a field error on malformed input.
    pub fn date(&mut self, field: &str, raw: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                self.fail(field, "must be a YYYY-MM-DD date");
                None
            }
        }
    }

    /// Require a syntactically valid email address.
    pub fn email(&mut self, field: &str, raw: &str) -> Option<String> {
        if EMAIL_RE.is_match(raw) {
            Some(raw.to_string())
        } else {
            self.fail(field, "must be a valid email address");
            None
        }
    }

    /// Require a non-empty, non-whitespace string.
    pub fn non_empty(&mut self, field: &str, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.fail(field, "must not be empty");
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Finish, returning all accumulated errors (empty vec = valid input).
    pub fn finish(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Is `email` syntactically valid?
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("client@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co.uk"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("nodot@example"));
    }

    #[test]
    fn test_checker_collects_every_failure() {
        let mut check = FieldChecker::new();
        check.id::<crate::common::entity_ids::Booking>("booking_id", "nope");
        check.email("client_email", "bad");
        check.instant("starts_at", "yesterday");
        let errors = check.finish();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "booking_id");
        assert_eq!(errors[1].field, "client_email");
        assert_eq!(errors[2].field, "starts_at");
    }
}
