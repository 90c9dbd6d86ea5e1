//! Date ranges and range splitting.
//!
//! Providers accept bounded date windows per call, so a multi-year request
//! must be split into an ordered, gap-free sequence of sub-ranges. The
//! splitting here is pure and deterministic: callers rely on chunk boundaries
//! mapping back to request parameters when a chunk is retried.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};

/// An inclusive span of calendar dates.
///
/// Invariant: `start <= end`. A zero-length range (`start == end`) is a
/// single day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateRange {
    /// First day of the range, inclusive.
    pub start: NaiveDate,
    /// Last day of the range, inclusive.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new range.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        assert!(start <= end, "range start {start} is after end {end}");
        Self { start, end }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Period length used to split a date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitPeriod {
    /// A fixed number of days added to the chunk's first day.
    Days(u32),
    /// Advance to the end of the month. A cursor already sitting on a month
    /// end advances to the end of the following month.
    MonthEnd,
}

impl SplitPeriod {
    /// Last day a chunk starting at `cursor` may cover, ignoring the overall
    /// range end.
    fn window_end(self, cursor: NaiveDate) -> NaiveDate {
        match self {
            Self::Days(n) => cursor
                .checked_add_days(Days::new(u64::from(n)))
                .unwrap_or(NaiveDate::MAX),
            Self::MonthEnd => {
                let eom = end_of_month(cursor);
                if eom > cursor { eom } else { end_of_month(next_month_start(cursor)) }
            }
        }
    }
}

/// Splits `[start, end]` into an ordered sequence of contiguous,
/// non-overlapping ranges, each at most one `period` long.
///
/// Each emitted range starts exactly one day after the previous range ends,
/// and the union of the ranges is exactly `[start, end]`. When
/// `end - start <= period` the result is a single range. Identical inputs
/// always produce identical output.
///
/// # Panics
///
/// Panics if `start > end`.
#[must_use]
pub fn split_date_range(start: NaiveDate, end: NaiveDate, period: SplitPeriod) -> Vec<DateRange> {
    assert!(start <= end, "range start {start} is after end {end}");

    let mut ranges = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        let stop = period.window_end(cursor).min(end);
        ranges.push(DateRange::new(cursor, stop));
        match stop.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    ranges
}

fn end_of_month(date: NaiveDate) -> NaiveDate {
    next_month_start(date)
        .pred_opt()
        .expect("month start has a predecessor")
}

fn next_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = (date.year(), date.month());
    let (year, month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is a valid date")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_split_covers_range_without_gaps() {
        let start = date(2020, 1, 1);
        let end = date(2021, 6, 15);
        let ranges = split_date_range(start, end, SplitPeriod::Days(208));

        assert_eq!(ranges.first().unwrap().start, start);
        assert_eq!(ranges.last().unwrap().end, end);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
        }
        for range in &ranges {
            assert!(range.start <= range.end);
        }
    }

    #[test]
    fn test_split_single_chunk_when_period_covers_span() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 31);
        let ranges = split_date_range(start, end, SplitPeriod::Days(45));
        assert_eq!(ranges, vec![DateRange::new(start, end)]);
    }

    #[test]
    fn test_split_zero_length_range() {
        let day = date(2024, 3, 5);
        let ranges = split_date_range(day, day, SplitPeriod::Days(30));
        assert_eq!(ranges, vec![DateRange::new(day, day)]);
    }

    #[test]
    fn test_split_is_deterministic() {
        let start = date(2015, 2, 10);
        let end = date(2019, 11, 30);
        let a = split_date_range(start, end, SplitPeriod::Days(208));
        let b = split_date_range(start, end, SplitPeriod::Days(208));
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_by_month_end() {
        let ranges = split_date_range(date(2020, 1, 15), date(2020, 3, 10), SplitPeriod::MonthEnd);
        assert_eq!(
            ranges,
            vec![
                DateRange::new(date(2020, 1, 15), date(2020, 1, 31)),
                DateRange::new(date(2020, 2, 1), date(2020, 2, 29)),
                DateRange::new(date(2020, 3, 1), date(2020, 3, 10)),
            ]
        );
    }

    #[test]
    fn test_split_month_end_rolls_forward_from_month_end() {
        // A cursor on a month end advances to the next month end.
        let ranges = split_date_range(date(2020, 1, 31), date(2020, 2, 29), SplitPeriod::MonthEnd);
        assert_eq!(
            ranges,
            vec![DateRange::new(date(2020, 1, 31), date(2020, 2, 29))]
        );
    }

    #[test]
    #[should_panic(expected = "is after end")]
    fn test_split_rejects_inverted_range() {
        let _ = split_date_range(date(2024, 2, 1), date(2024, 1, 1), SplitPeriod::Days(10));
    }
}
