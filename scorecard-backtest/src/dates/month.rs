//! Month boundary calculator.
//!
//! Rewinding works by repeatedly stepping back `day()` days: from any date
//! that lands on the last day of the previous month, so `k` steps reach the
//! last day of the month `k` months before the reference date.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Days, Local, NaiveDate};
use thiserror::Error;
use tracing::debug;

/// Default output pattern (`2024-02-29`).
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid date format: {0:?}")]
    InvalidFormat(String),

    #[error("Cannot parse {value:?} back into a date with format {format:?}")]
    RoundTrip { value: String, format: String },
}

pub type DateResult<T> = Result<T, DateError>;

/// Computes month boundaries relative to a fixed reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBoundaryCalculator {
    reference: NaiveDate,
}

impl Default for MonthBoundaryCalculator {
    fn default() -> Self {
        Self::today()
    }
}

impl MonthBoundaryCalculator {
    /// Create a calculator anchored at `reference`.
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    /// Create a calculator anchored at the local system date.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    /// Last day of the month `months_ago` months back.
    ///
    /// `months_ago == 0` returns the reference date itself, not the end of
    /// its month.
    pub fn last_day(&self, months_ago: u32) -> NaiveDate {
        let mut date = self.reference;
        for _ in 0..months_ago {
            match date.checked_sub_days(Days::new(u64::from(date.day()))) {
                Some(prev) => date = prev,
                None => break,
            }
        }
        date
    }

    /// First day of the month `months_ago` months back.
    pub fn first_day(&self, months_ago: u32) -> NaiveDate {
        let last = self.last_day(months_ago);
        NaiveDate::from_ymd_opt(last.year(), last.month(), 1).unwrap_or(last)
    }

    /// Last day of the month `months_ago` months back, formatted with `format`.
    pub fn last_day_of_month(&self, months_ago: u32, format: &str) -> DateResult<String> {
        let date = self.last_day(months_ago);
        debug!("Last day {} month(s) before {}: {}", months_ago, self.reference, date);
        format_date(date, format)
    }

    /// First day of the month `months_ago` months back, formatted with `format`.
    ///
    /// The last-day string is parsed back with the same pattern and its day
    /// replaced by 1, so `format` must carry enough fields to identify a date.
    pub fn first_day_of_month(&self, months_ago: u32, format: &str) -> DateResult<String> {
        let value = self.last_day_of_month(months_ago, format)?;
        let round_trip = || DateError::RoundTrip {
            value: value.clone(),
            format: format.to_string(),
        };

        let parsed = NaiveDate::parse_from_str(&value, format).map_err(|_| round_trip())?;
        let first = parsed.with_day(1).ok_or_else(round_trip)?;
        debug!("First day {} month(s) before {}: {}", months_ago, self.reference, first);
        format_date(first, format)
    }

    /// Last day of the previous month in `DEFAULT_DATE_FORMAT`.
    pub fn previous_month_last_day(&self) -> DateResult<String> {
        self.last_day_of_month(1, DEFAULT_DATE_FORMAT)
    }

    /// First day of the previous month in `DEFAULT_DATE_FORMAT`.
    pub fn previous_month_first_day(&self) -> DateResult<String> {
        self.first_day_of_month(1, DEFAULT_DATE_FORMAT)
    }
}

/// Format `date` with a strftime pattern, rejecting malformed patterns and
/// specifiers a bare date cannot satisfy (e.g. `%H`).
pub fn format_date(date: NaiveDate, format: &str) -> DateResult<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(DateError::InvalidFormat(format.to_string()));
    }

    let mut out = String::new();
    write!(out, "{}", date.format_with_items(items.iter()))
        .map_err(|_| DateError::InvalidFormat(format.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_zero_months_is_reference() {
        let calc = MonthBoundaryCalculator::new(date(2024, 3, 15));
        assert_eq!(calc.last_day(0), date(2024, 3, 15));
        assert_eq!(calc.last_day_of_month(0, DEFAULT_DATE_FORMAT).unwrap(), "2024-03-15");
    }

    #[test]
    fn test_last_day_leap_year() {
        let calc = MonthBoundaryCalculator::new(date(2024, 3, 15));
        assert_eq!(calc.last_day(1), date(2024, 2, 29));
        assert_eq!(calc.last_day(2), date(2024, 1, 31));
        assert_eq!(calc.last_day(3), date(2023, 12, 31));
    }

    #[test]
    fn test_last_day_from_month_end() {
        let calc = MonthBoundaryCalculator::new(date(2023, 3, 31));
        assert_eq!(calc.last_day(1), date(2023, 2, 28));
    }

    #[test]
    fn test_first_day() {
        let calc = MonthBoundaryCalculator::new(date(2021, 1, 10));
        assert_eq!(calc.first_day(1), date(2020, 12, 1));
        assert_eq!(calc.first_day(0), date(2021, 1, 1));
    }

    #[test]
    fn test_previous_month_defaults() {
        let calc = MonthBoundaryCalculator::new(date(2024, 3, 15));
        assert_eq!(calc.previous_month_last_day().unwrap(), "2024-02-29");
        assert_eq!(calc.previous_month_first_day().unwrap(), "2024-02-01");
    }

    #[test]
    fn test_custom_format() {
        let calc = MonthBoundaryCalculator::new(date(2024, 3, 15));
        assert_eq!(calc.last_day_of_month(1, "%d/%m/%Y").unwrap(), "29/02/2024");
        assert_eq!(calc.first_day_of_month(1, "%d/%m/%Y").unwrap(), "01/02/2024");
        assert_eq!(calc.first_day_of_month(2, "%Y%m%d").unwrap(), "20240101");
    }

    #[test]
    fn test_invalid_format() {
        let calc = MonthBoundaryCalculator::new(date(2024, 3, 15));
        assert!(matches!(
            calc.last_day_of_month(1, "%Y-%"),
            Err(DateError::InvalidFormat(_))
        ));
        assert!(matches!(
            calc.first_day_of_month(1, "%Y-%m-%d %H:%M"),
            Err(DateError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_round_trip_failure() {
        let calc = MonthBoundaryCalculator::new(date(2024, 3, 15));
        assert_eq!(calc.last_day_of_month(1, "%Y-%m").unwrap(), "2024-02");

        let err = calc.first_day_of_month(1, "%Y-%m").unwrap_err();
        assert_eq!(
            err,
            DateError::RoundTrip {
                value: "2024-02".to_string(),
                format: "%Y-%m".to_string(),
            }
        );
    }
}
