//! Stationarity and log-domain transforms
//!
//! Differencing and its inverse feed the VAR forecaster; the log transform
//! feeds the China price regression. A [`LogTransform`] is fitted once on the
//! training drivers and then carried to every predict call, so the shift
//! constants used at forecast time are the ones the regression was trained on.

use crate::data::{Driver, DriverSet, HistoricalPanel, PANEL_WIDTH};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// First differences, `series[t] - series[t - 1]` for `t >= 1`
pub fn difference(series: &[f64]) -> Vec<f64> {
    series.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Re-integrate differences onto `last_value` by cumulative summation
pub fn integrate(last_value: f64, differences: &[f64]) -> Vec<f64> {
    differences
        .iter()
        .scan(last_value, |level, diff| {
            *level += diff;
            Some(*level)
        })
        .collect()
}

/// Panel of first differences, one month shorter than its source
#[derive(Debug, Clone)]
pub struct DifferencedPanel {
    months: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
}

impl DifferencedPanel {
    /// Months of the differenced observations; the source's first month is gone
    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    /// Differenced observations in VAR column order
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the panel is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Difference every panel variable independently
pub fn difference_panel(panel: &HistoricalPanel) -> Result<DifferencedPanel> {
    if panel.len() < 2 {
        return Err(ForecastError::InsufficientData(format!(
            "Differencing needs at least 2 months, got {}",
            panel.len()
        )));
    }

    let levels = panel.to_matrix_rows();
    let columns: Vec<Vec<f64>> = (0..PANEL_WIDTH)
        .map(|j| difference(&levels.iter().map(|r| r[j]).collect::<Vec<_>>()))
        .collect();

    let rows = (0..panel.len() - 1)
        .map(|t| columns.iter().map(|col| col[t]).collect())
        .collect();

    Ok(DifferencedPanel {
        months: panel.months()[1..].to_vec(),
        rows,
    })
}

/// Integrate each variable of a multi-step differenced forecast onto its seed
///
/// `seed` holds the last observed level per variable and `differences` holds
/// one row per forecast step.
pub fn integrate_columns(seed: &[f64], differences: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    if let Some(row) = differences.iter().find(|r| r.len() != seed.len()) {
        return Err(ForecastError::DataError(format!(
            "Forecast row has {} variables, seed has {}",
            row.len(),
            seed.len()
        )));
    }

    let columns: Vec<Vec<f64>> = seed
        .iter()
        .enumerate()
        .map(|(j, last)| integrate(*last, &differences.iter().map(|r| r[j]).collect::<Vec<_>>()))
        .collect();

    Ok((0..differences.len())
        .map(|t| columns.iter().map(|col| col[t]).collect())
        .collect())
}

/// Shift that makes a column strictly positive before taking logs.
///
/// Columns with a negative minimum `m` are shifted by `|m| + 1`; other columns
/// are not shifted.
pub fn log_shift(values: &[f64]) -> f64 {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if min < 0.0 {
        min.abs() + 1.0
    } else {
        0.0
    }
}

fn shifted_ln(value: f64, shift: f64, label: &str) -> Result<f64> {
    let arg = value + shift;
    if arg <= 0.0 || !arg.is_finite() {
        return Err(ForecastError::DegenerateStatistics(format!(
            "Log argument for '{}' is {} (value {} + shift {})",
            label, arg, value, shift
        )));
    }
    Ok(arg.ln())
}

/// Log-transform a single column with its own shift constant.
///
/// A non-negative column containing zero fails: the shift only applies to
/// columns with negative values.
pub fn log_transform_column(values: &[f64]) -> Result<Vec<f64>> {
    let shift = log_shift(values);
    values
        .iter()
        .map(|v| shifted_ln(*v, shift, "column"))
        .collect()
}

/// How the China regressor picks log shift constants at predict time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogShiftPolicy {
    /// Reuse the constants fitted on the training drivers
    #[default]
    Training,
    /// Recompute the constants from each predicted frame
    PerFrame,
}

/// Log transform with per-driver shift constants fitted on a frame of drivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogTransform {
    shifts: [f64; 9],
    min: [f64; 9],
    max: [f64; 9],
}

impl LogTransform {
    /// Fit shift constants from the column statistics of `rows`
    pub fn fit(rows: &[DriverSet]) -> Result<Self> {
        if rows.is_empty() {
            return Err(ForecastError::InsufficientData(
                "Cannot fit a log transform on an empty frame".to_string(),
            ));
        }

        let mut shifts = [0.0; 9];
        let mut min = [f64::INFINITY; 9];
        let mut max = [f64::NEG_INFINITY; 9];

        for driver in Driver::ALL {
            let column: Vec<f64> = rows.iter().map(|r| r.get(driver)).collect();
            let i = driver.index();
            shifts[i] = log_shift(&column);
            min[i] = column.iter().copied().fold(f64::INFINITY, f64::min);
            max[i] = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        }

        Ok(Self { shifts, min, max })
    }

    /// Shift constant applied to a driver
    pub fn shift(&self, driver: Driver) -> f64 {
        self.shifts[driver.index()]
    }

    /// Log-transform one row with the fitted constants
    pub fn transform_row(&self, row: &DriverSet) -> Result<[f64; 9]> {
        let mut out = [0.0; 9];
        for driver in Driver::ALL {
            let i = driver.index();
            out[i] = shifted_ln(row.get(driver), self.shifts[i], driver.column_name())?;
        }
        Ok(out)
    }

    /// Log-transform every row with the fitted constants
    pub fn transform(&self, rows: &[DriverSet]) -> Result<Vec<[f64; 9]>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }

    /// Drivers whose values in `rows` leave the range seen during fitting
    pub fn out_of_range(&self, rows: &[DriverSet]) -> Vec<Driver> {
        Driver::ALL
            .into_iter()
            .filter(|d| {
                let i = d.index();
                rows.iter()
                    .any(|r| r.get(*d) < self.min[i] || r.get(*d) > self.max[i])
            })
            .collect()
    }
}

/// Log-transform a frame of drivers with constants computed from that frame
pub fn log_transform(rows: &[DriverSet]) -> Result<Vec<[f64; 9]>> {
    LogTransform::fit(rows)?.transform(rows)
}
