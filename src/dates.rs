//! ISO week arithmetic for the weekly schedule.
//!
//! Weeks start on Monday. Dates travel as `YYYY-MM-DD` strings between
//! the store and the view models; comparisons on those strings are
//! lexicographic, which matches chronological order for that format.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{FieldOpsError, Result};

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Days in a schedule week.
pub const DAYS_PER_WEEK: usize = 7;

/// Parse a `YYYY-MM-DD` string.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE_FORMAT)
        .map_err(|_| FieldOpsError::InvalidDate(value.to_string()))
}

pub fn to_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Monday of the week containing `date`. Sunday belongs to the week that
/// started six days earlier.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Last day (Sunday) of the week starting at `week_start`.
pub fn end_of_week(week_start: NaiveDate) -> NaiveDate {
    week_start + Duration::days(DAYS_PER_WEEK as i64 - 1)
}

/// `Dec 30 – Jan 5`
pub fn range_label(week_start: NaiveDate) -> String {
    let end = end_of_week(week_start);
    format!("{} \u{2013} {}", short_month_day(week_start), short_month_day(end))
}

/// `Tue 31`
pub fn day_label(date: NaiveDate) -> String {
    date.format("%a %-d").to_string()
}

fn short_month_day(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Inclusive `[start, end]` span of one schedule week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    /// Range beginning at `week_start`, taken as given (not snapped to Monday).
    pub fn for_week_start(week_start: NaiveDate) -> Self {
        Self {
            start: week_start,
            end: end_of_week(week_start),
        }
    }

    /// The Monday-based week that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self::for_week_start(start_of_week(date))
    }

    pub fn start_iso(&self) -> String {
        to_iso(self.start)
    }

    pub fn end_iso(&self) -> String {
        to_iso(self.end)
    }

    /// Inclusive string comparison, the same test the store query applies.
    pub fn contains_day(&self, day: &str) -> bool {
        let start = self.start_iso();
        let end = self.end_iso();
        day >= start.as_str() && day <= end.as_str()
    }

    /// The seven dates of the week, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        (0..DAYS_PER_WEEK as i64)
            .map(|offset| self.start + Duration::days(offset))
            .collect()
    }

    pub fn label(&self) -> String {
        range_label(self.start)
    }
}
