//! `YYYY-MM-DD` codec for calendar dates.
//!
//! Backends backed by timestamp columns may answer with a full RFC 3339
//! value; only the leading date part is significant.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a date, ignoring anything after the first ten characters.
pub fn parse(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(*date))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates() {
        let date = parse("2024-01-03").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn truncates_timestamps_to_the_date() {
        let date = parse("2024-01-03T00:00:00Z").unwrap();
        assert_eq!(format(date), "2024-01-03");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse("03.01.2024").is_err());
        assert!(parse("2024-13-01").is_err());
        assert!(parse("").is_err());
    }
}
