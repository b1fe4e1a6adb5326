//! Lenient date and datetime values.
//!
//! The server occasionally sends `null` or malformed timestamps. A value that
//! does not parse is kept verbatim instead of failing the surrounding decode,
//! so downstream code sees either a parsed value or the original string.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Format of datetime fields (`createdAt`, `updatedAt`, ...).
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Format of date-only fields (`startDate`, `dueDate`, ...).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A value that is either parsed or kept as the raw string the server sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    /// Successfully parsed value.
    Parsed(T),
    /// Raw value that could not be parsed.
    Raw(String),
}

/// A datetime field.
pub type Timestamp = Lenient<DateTime<FixedOffset>>;

/// A date-only field.
pub type Date = Lenient<NaiveDate>;

/// Types that can be parsed from a server timestamp string.
pub trait LenientParse: Sized {
    /// Parse the string, returning `None` when it does not match.
    fn parse_lenient(s: &str) -> Option<Self>;
}

impl LenientParse for DateTime<FixedOffset> {
    fn parse_lenient(s: &str) -> Option<Self> {
        // The API emits RFC 3339 (`Z` suffix, fractional seconds) in practice.
        DateTime::parse_from_str(s, DATETIME_FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(s))
            .ok()
    }
}

impl LenientParse for NaiveDate {
    fn parse_lenient(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
    }
}

impl<T: LenientParse> Lenient<T> {
    /// Parse a string, keeping it raw on failure.
    pub fn parse(s: &str) -> Self {
        match T::parse_lenient(s) {
            Some(parsed) => Self::Parsed(parsed),
            None => Self::Raw(s.to_string()),
        }
    }
}

impl<T> Lenient<T> {
    /// The parsed value, if parsing succeeded.
    pub fn parsed(&self) -> Option<&T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// Whether the value was parsed.
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

impl<'de, T: LenientParse> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Self::parse(&s),
            other => Self::Raw(other.to_string()),
        })
    }
}

impl<T: fmt::Display> fmt::Display for Lenient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(value) => write!(f, "{value}"),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default)]
        at: Option<Timestamp>,
        #[serde(default)]
        on: Option<Date>,
    }

    #[test]
    fn test_datetime_fixed_format() {
        let ts = Timestamp::parse("2023-04-05T10:11:12+0200");
        let parsed = ts.parsed().expect("should parse");
        assert_eq!(parsed.hour(), 10);
        assert_eq!(parsed.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_datetime_rfc3339_zulu() {
        let ts = Timestamp::parse("2023-04-05T10:11:12.345Z");
        assert!(ts.is_parsed());
    }

    #[test]
    fn test_datetime_malformed_kept_raw() {
        let ts = Timestamp::parse("yesterday-ish");
        assert_eq!(ts, Lenient::Raw("yesterday-ish".to_string()));
        assert_eq!(ts.to_string(), "yesterday-ish");
    }

    #[test]
    fn test_date_parses() {
        let date = Date::parse("2024-02-29");
        assert_eq!(date.parsed().map(|d| d.day()), Some(29));
    }

    #[test]
    fn test_date_with_time_is_raw() {
        let date = Date::parse("2024-02-29T00:00:00Z");
        assert!(!date.is_parsed());
    }

    #[test]
    fn test_deserialize_null_and_missing() {
        let sample: Sample = serde_json::from_value(serde_json::json!({ "at": null })).unwrap();
        assert!(sample.at.is_none());
        assert!(sample.on.is_none());
    }

    #[test]
    fn test_deserialize_non_string_kept_raw() {
        let sample: Sample =
            serde_json::from_value(serde_json::json!({ "at": 12345, "on": "2020-01-02" })).unwrap();
        assert_eq!(sample.at, Some(Lenient::Raw("12345".to_string())));
        assert!(sample.on.unwrap().is_parsed());
    }

    #[test]
    fn test_serialize_parsed_and_raw() {
        let parsed = serde_json::to_value(Date::parse("2020-01-02")).unwrap();
        assert_eq!(parsed, serde_json::json!("2020-01-02"));
        let raw = serde_json::to_value(Date::parse("soon")).unwrap();
        assert_eq!(raw, serde_json::json!("soon"));
    }
}
