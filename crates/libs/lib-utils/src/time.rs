//! # Time Utilities
//!
//! Time formatting and parsing using chrono. Message timestamps are stored
//! and transmitted as RFC3339 UTC; SQLite's `CURRENT_TIMESTAMP` columns use
//! the `"YYYY-MM-DD HH:MM:SS"` spelling, so parsing accepts both.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format time as RFC3339 string.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339()
}

/// Parse RFC3339 string to UTC DateTime.
pub fn parse_utc(moment: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(moment)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::FailToDateParse(moment.to_string()))
}

/// Parse a timestamp that may come either as RFC3339 or as SQLite's
/// `CURRENT_TIMESTAMP` format (`"2024-05-01 12:30:00"`, implicitly UTC).
pub fn parse_db_timestamp(moment: &str) -> Result<DateTime<Utc>, Error> {
    if let Ok(parsed) = parse_utc(moment) {
        return Ok(parsed);
    }
    NaiveDateTime::parse_from_str(moment, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(moment, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::FailToDateParse(moment.to_string()))
}

// region:    --- Error
#[derive(Debug)]
pub enum Error {
    FailToDateParse(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
// endregion: --- Error
