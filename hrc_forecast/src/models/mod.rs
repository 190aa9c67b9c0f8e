//! Forecasting models for the HRC price pipeline

use crate::error::{ForecastError, Result};
use crate::metrics::FitQuality;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Price path over consecutive months
///
/// Created per forecast call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPath {
    months: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ForecastPath {
    /// Create a new forecast path
    pub fn new(months: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if months.len() != values.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Months length ({}) doesn't match values length ({})",
                months.len(),
                values.len()
            )));
        }

        if months.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::InvalidParameter(
                "Forecast months must be strictly increasing".to_string(),
            ));
        }

        Ok(Self { months, values })
    }

    /// Path whose first month carries a known price and the rest carry predictions.
    ///
    /// The anchor value is copied, never predicted, so the path splices onto
    /// the historical series.
    pub fn anchored(
        anchor_month: NaiveDate,
        anchor_value: f64,
        months: &[NaiveDate],
        predicted: &[f64],
    ) -> Result<Self> {
        let mut all_months = Vec::with_capacity(months.len() + 1);
        all_months.push(anchor_month);
        all_months.extend_from_slice(months);

        let mut values = Vec::with_capacity(predicted.len() + 1);
        values.push(anchor_value);
        values.extend_from_slice(predicted);

        Self::new(all_months, values)
    }

    /// Get the months
    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    /// Get the values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of months in the path
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First `(month, value)` pair
    pub fn first(&self) -> Option<(NaiveDate, f64)> {
        self.months.first().copied().zip(self.values.first().copied())
    }

    /// Value for a given month
    pub fn value_at(&self, month: NaiveDate) -> Option<f64> {
        self.months
            .iter()
            .position(|m| *m == month)
            .map(|i| self.values[i])
    }

    /// `(month, value)` pairs
    pub fn points(&self) -> Vec<(NaiveDate, f64)> {
        self.months
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .collect()
    }

    /// Months and values strictly after `month`
    pub fn after(&self, month: NaiveDate) -> (Vec<NaiveDate>, Vec<f64>) {
        self.points().into_iter().filter(|(m, _)| *m > month).unzip()
    }
}

/// Model that can be trained on its input data
pub trait ForecastModel: Debug + Clone {
    /// Training data the model consumes
    type Input: ?Sized;

    /// The type of trained model produced
    type Trained: Debug;

    /// Train the model
    fn train(&self, data: &Self::Input) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Trained regression that maps rows of covariates to prices
pub trait TrainedRegression: Debug {
    /// One observation of covariates
    type Row;

    /// Predict a price for each row
    fn predict(&self, rows: &[Self::Row]) -> Result<Vec<f64>>;

    /// In-sample fit diagnostics
    fn fit_quality(&self) -> &FitQuality;

    /// Name of the model
    fn name(&self) -> &str;
}

pub mod china;
pub mod japan;
pub mod ols;
pub mod var;

pub use china::{ChinaPriceModel, FittedChinaModel};
pub use japan::{FittedJapanModel, JapanPriceModel, PolynomialBasis, PolynomialDegree};
pub use var::{FittedVar, InformationCriterion, LagScore, LagSelection, VarForecast, VarModel};
