//! Shared primitive types used across the entire dashboard core.

use chrono::{Datelike, Months, NaiveDate};

/// A live-update tick. One tick = one refresh of the current snapshot.
pub type Tick = u64;

/// Stable key of a sector in the registry (e.g. "AGRICULTURE").
pub type SectorCode = String;

/// The canonical run identifier.
pub type RunId = String;

/// Normalize any date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month, so with_day(1) cannot fail.
    date.with_day(1).unwrap_or(date)
}

/// Step a first-of-month date forward by `n` months.
/// Saturates at the input date if chrono cannot represent the result.
pub fn add_months(month: NaiveDate, n: u32) -> NaiveDate {
    month.checked_add_months(Months::new(n)).unwrap_or(month)
}
