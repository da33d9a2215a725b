//! Time-slot generation.
//!
//! A day's operating window `[open, close)` is cut into candidate slots that
//! start every `granularity` minutes and last `duration` minutes. Each slot is
//! checked against the shop's existing blocking bookings: it is available
//! while fewer than `capacity` bookings are active at every instant inside it.
//! All intervals are half-open, so a booking ending at 10:00 does not collide
//! with a slot starting at 10:00.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

pub use reservo_database::overlap::{peak_concurrency, Interval};

/// Opening hours of one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl DayWindow {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Option<Self> {
        (open < close).then_some(Self { open, close })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub available: bool,
    /// Free parallel seats left in this slot.
    pub remaining: u32,
}

/// Everything slot generation needs besides the bookings
#[derive(Debug, Clone, Copy)]
pub struct SlotQuery {
    pub date: NaiveDate,
    /// `None` when the shop is closed that day.
    pub window: Option<DayWindow>,
    pub duration_minutes: u32,
    pub granularity_minutes: u32,
    pub capacity: u32,
    /// Slots starting earlier than this are reported unavailable.
    pub not_before: Option<NaiveDateTime>,
}

/// Compute the candidate slots of one day.
///
/// Closed days, zero durations and durations longer than the window produce
/// no slots.
pub fn generate_slots(query: &SlotQuery, bookings: &[Interval]) -> Vec<Slot> {
    let Some(window) = query.window else {
        return Vec::new();
    };
    if query.duration_minutes == 0 || query.granularity_minutes == 0 {
        return Vec::new();
    }

    let duration = Duration::minutes(i64::from(query.duration_minutes));
    let step = Duration::minutes(i64::from(query.granularity_minutes));
    let open = query.date.and_time(window.open);
    let close = query.date.and_time(window.close);

    let mut sorted: Vec<Interval> = bookings
        .iter()
        .copied()
        .filter(|b| b.start < b.end)
        .collect();
    sorted.sort();

    let mut slots = Vec::new();
    let mut next = 0usize;
    let mut active: Vec<Interval> = Vec::new();
    let mut start = open;

    while start + duration <= close {
        let end = start + duration;

        // Slot ends only move forward, so each booking is admitted once.
        while next < sorted.len() && sorted[next].start < end {
            active.push(sorted[next]);
            next += 1;
        }
        active.retain(|b| b.end > start);

        let peak = peak_concurrency(&active, start, end);
        let remaining = query.capacity.saturating_sub(peak);
        let too_early = query.not_before.is_some_and(|limit| start < limit);

        slots.push(Slot {
            start,
            end,
            available: remaining > 0 && !too_early,
            remaining,
        });

        start += step;
    }

    slots
}
