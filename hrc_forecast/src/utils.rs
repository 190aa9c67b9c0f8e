//! Utility functions for the hrc_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use std::fmt::Write;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a date string into a month key.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and `MM/DD/YYYY`. The date must
/// fall on the first day of a month.
pub fn parse_month(value: &str) -> Result<NaiveDate> {
    let value = value.trim();

    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| ForecastError::DataError(format!("Unrecognised date: '{}'", value)))?;

    if !is_month_start(parsed) {
        return Err(ForecastError::DataError(format!(
            "Date {} is not the first day of a month",
            parsed
        )));
    }

    Ok(parsed)
}

/// Whether the date is the first day of its month
pub fn is_month_start(date: NaiveDate) -> bool {
    date.day() == 1
}

/// Shift a month key by `n` months
pub fn add_months(month: NaiveDate, n: u32) -> Result<NaiveDate> {
    month
        .checked_add_months(Months::new(n))
        .ok_or_else(|| ForecastError::InvalidParameter(format!("Month {} + {} overflows", month, n)))
}

/// The month immediately after `month`
pub fn next_month(month: NaiveDate) -> Result<NaiveDate> {
    add_months(month, 1)
}

/// Contiguous monthly timestamps starting at `start`
pub fn month_range(start: NaiveDate, periods: usize) -> Result<Vec<NaiveDate>> {
    let mut months = Vec::with_capacity(periods);
    let mut current = start;

    for i in 0..periods {
        if i > 0 {
            current = next_month(current)?;
        }
        months.push(current);
    }

    Ok(months)
}

/// Whether each month in the slice is exactly one month after its predecessor
pub fn is_contiguous(months: &[NaiveDate]) -> bool {
    months
        .windows(2)
        .all(|w| matches!(next_month(w[0]), Ok(next) if next == w[1]))
}

/// Human-facing month label, `Nov-24` with the default format.
///
/// Fails when the pattern asks for a field a date does not carry, such as
/// `%H` or `%z`.
pub fn format_month(month: NaiveDate, format: &str) -> Result<String> {
    let mut label = String::new();
    write!(label, "{}", month.format(format)).map_err(|_| {
        ForecastError::ConfigError(format!(
            "Month format '{}' cannot be applied to a calendar month",
            format
        ))
    })?;
    Ok(label)
}
