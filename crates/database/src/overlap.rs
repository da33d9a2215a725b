//! Concurrency of half-open `[start, end)` intervals.
//!
//! Slot generation and the transactional capacity check both count bookings
//! with [`peak_concurrency`], so availability and writes agree on when a shop
//! is full.

use chrono::NaiveDateTime;

/// An occupied `[start, end)` interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && self.end > start
    }
}

/// Maximum number of `intervals` active at the same instant within `[start, end)`.
pub fn peak_concurrency(intervals: &[Interval], start: NaiveDateTime, end: NaiveDateTime) -> u32 {
    let mut events: Vec<(NaiveDateTime, i32)> = intervals
        .iter()
        .filter(|b| b.overlaps(start, end))
        .flat_map(|b| [(b.start.max(start), 1), (b.end.min(end), -1)])
        .collect();
    // (t, -1) sorts before (t, 1): a booking ending at t frees its seat for one starting at t.
    events.sort_unstable();

    let mut current = 0i32;
    let mut peak = 0i32;
    for (_, delta) in events {
        current += delta;
        peak = peak.max(current);
    }
    peak.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn counts_concurrent_intervals_only() {
        // 9:00-9:30 and 9:30-10:00 never overlap each other.
        let chained = [
            Interval::new(at(9, 0), at(9, 30)),
            Interval::new(at(9, 30), at(10, 0)),
        ];
        assert_eq!(peak_concurrency(&chained, at(9, 0), at(10, 0)), 1);

        let stacked = [
            Interval::new(at(9, 0), at(10, 0)),
            Interval::new(at(9, 15), at(9, 45)),
        ];
        assert_eq!(peak_concurrency(&stacked, at(9, 0), at(10, 0)), 2);
    }

    #[test]
    fn touching_intervals_do_not_count() {
        let intervals = [
            Interval::new(at(8, 0), at(9, 0)),
            Interval::new(at(10, 0), at(11, 0)),
        ];
        assert_eq!(peak_concurrency(&intervals, at(9, 0), at(10, 0)), 0);
    }

    #[test]
    fn nested_intervals() {
        let intervals = [
            Interval::new(at(9, 0), at(12, 0)),
            Interval::new(at(10, 0), at(11, 0)),
            Interval::new(at(10, 30), at(10, 45)),
        ];
        assert_eq!(peak_concurrency(&intervals, at(9, 0), at(12, 0)), 3);
        assert_eq!(peak_concurrency(&intervals, at(11, 0), at(12, 0)), 1);
        assert_eq!(peak_concurrency(&intervals, at(12, 0), at(13, 0)), 0);
    }
}
