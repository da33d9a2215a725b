//! Validation of shop, service and schedule input.

use chrono::NaiveTime;
use reservo_database::formats::parse_time;
use reservo_database::ScheduleDay;

use crate::slots::DayWindow;
use crate::types::{BookingError, BookingResult};

pub const SLOT_INTERVAL_RANGE: std::ops::RangeInclusive<i64> = 5..=240;
pub const DURATION_RANGE: std::ops::RangeInclusive<i64> = 5..=720;
pub const MAX_CAPACITY: i64 = 100;

pub fn validate_name(field: &str, value: &str) -> BookingResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookingError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > 100 {
        return Err(BookingError::validation(format!(
            "{field} must be at most 100 characters long"
        )));
    }
    Ok(())
}

pub fn validate_slot_interval(minutes: i64) -> BookingResult<()> {
    if !SLOT_INTERVAL_RANGE.contains(&minutes) {
        return Err(BookingError::validation(
            "slot_interval_minutes must be between 5 and 240",
        ));
    }
    Ok(())
}

pub fn validate_capacity(capacity: i64) -> BookingResult<()> {
    if !(1..=MAX_CAPACITY).contains(&capacity) {
        return Err(BookingError::validation(format!(
            "capacity must be between 1 and {MAX_CAPACITY}"
        )));
    }
    Ok(())
}

pub fn validate_duration(minutes: i64) -> BookingResult<()> {
    if !DURATION_RANGE.contains(&minutes) {
        return Err(BookingError::validation(
            "duration_minutes must be between 5 and 720",
        ));
    }
    Ok(())
}

pub fn validate_price(price_cents: i64) -> BookingResult<()> {
    if price_cents < 0 {
        return Err(BookingError::validation("price_cents cannot be negative"));
    }
    Ok(())
}

/// Check a replacement week and normalise it: closed days lose their times
/// and entries come back ordered Monday first.
pub fn normalize_week(days: Vec<ScheduleDay>) -> BookingResult<Vec<ScheduleDay>> {
    let mut seen = [false; 7];
    let mut normalized = Vec::with_capacity(days.len());

    for day in days {
        if !(0..=6).contains(&day.day_of_week) {
            return Err(BookingError::validation(format!(
                "day_of_week must be between 0 (Monday) and 6 (Sunday), got {}",
                day.day_of_week
            )));
        }
        let index = day.day_of_week as usize;
        if seen[index] {
            return Err(BookingError::validation(format!(
                "day_of_week {} appears more than once",
                day.day_of_week
            )));
        }
        seen[index] = true;

        if day.is_closed {
            normalized.push(ScheduleDay {
                open_time: None,
                close_time: None,
                ..day
            });
            continue;
        }

        let window = parse_window(day.open_time.as_deref(), day.close_time.as_deref())?;
        normalized.push(ScheduleDay {
            day_of_week: day.day_of_week,
            open_time: Some(window.open.format("%H:%M").to_string()),
            close_time: Some(window.close.format("%H:%M").to_string()),
            is_closed: false,
        });
    }

    normalized.sort_by_key(|day| day.day_of_week);
    Ok(normalized)
}

/// Parse `HH:MM` open and close times into a window with open < close
pub fn parse_window(open: Option<&str>, close: Option<&str>) -> BookingResult<DayWindow> {
    let (Some(open), Some(close)) = (open, close) else {
        return Err(BookingError::validation(
            "open_time and close_time are required for open days",
        ));
    };
    let open: NaiveTime = parse_time(open)?;
    let close: NaiveTime = parse_time(close)?;

    DayWindow::new(open, close)
        .ok_or_else(|| BookingError::validation("open_time must be before close_time"))
}
