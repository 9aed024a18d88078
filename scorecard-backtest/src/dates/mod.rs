//! Calendar month boundaries.
//!
//! Rewinds a reference date to the last or first day of the month a given
//! number of months back, returning either a `NaiveDate` or a formatted string.

pub mod month;

pub use month::{format_date, DateError, DateResult, MonthBoundaryCalculator, DEFAULT_DATE_FORMAT};
