//! Text encodings for dates and times stored in SQLite.
//!
//! Appointment times are shop-local wall-clock values stored as
//! `YYYY-MM-DDTHH:MM:SS`, so lexical order equals chronological order and
//! overlap checks can compare the columns directly.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::types::{DatabaseError, DatabaseResult};

pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

const DATETIME_FORMAT_SHORT: &str = "%Y-%m-%dT%H:%M";

/// Four-digit years only; wider years format with a sign and break ordering.
const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

pub fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Parse a shop-local datetime, accepting values with or without seconds.
pub fn parse_datetime(value: &str) -> DatabaseResult<NaiveDateTime> {
    let trimmed = value.trim();
    NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT_SHORT))
        .ok()
        .filter(|parsed| YEARS.contains(&parsed.year()))
        .ok_or_else(|| {
            DatabaseError::ValidationError(format!(
                "invalid datetime '{value}', expected YYYY-MM-DDTHH:MM:SS"
            ))
        })
}

pub fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> DatabaseResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .ok()
        .filter(|parsed| YEARS.contains(&parsed.year()))
        .ok_or_else(|| {
            DatabaseError::ValidationError(format!("invalid date '{value}', expected YYYY-MM-DD"))
        })
}

pub fn format_time(value: NaiveTime) -> String {
    value.format(TIME_FORMAT).to_string()
}

pub fn parse_time(value: &str) -> DatabaseResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
        DatabaseError::ValidationError(format!("invalid time '{value}', expected HH:MM"))
    })
}

/// Audit timestamp for `created_at` / `updated_at` columns.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
