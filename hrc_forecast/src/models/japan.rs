//! Japan HRC price regression on the contemporaneous China price

use crate::data::PriceHistory;
use crate::error::{ForecastError, Result};
use crate::metrics::{fit_quality, FitQuality};
use crate::models::ols::{fit_ols, OlsFit};
use crate::models::{ForecastModel, TrainedRegression};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Degree of the polynomial expansion of the China price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolynomialDegree {
    #[default]
    Linear,
    Quadratic,
}

/// Feature expansion of a single input, fixed at training time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolynomialBasis {
    degree: PolynomialDegree,
}

impl PolynomialBasis {
    pub fn new(degree: PolynomialDegree) -> Self {
        Self { degree }
    }

    pub fn degree(&self) -> PolynomialDegree {
        self.degree
    }

    /// `[x]` or `[x, x^2]`
    pub fn expand(&self, x: f64) -> Vec<f64> {
        match self.degree {
            PolynomialDegree::Linear => vec![x],
            PolynomialDegree::Quadratic => vec![x, x * x],
        }
    }

    /// Number of generated features
    pub fn width(&self) -> usize {
        match self.degree {
            PolynomialDegree::Linear => 1,
            PolynomialDegree::Quadratic => 2,
        }
    }
}

/// Regression of the Japan price on the China price
#[derive(Debug, Clone)]
pub struct JapanPriceModel {
    /// Name of the model
    name: String,
    basis: PolynomialBasis,
    /// Month whose actual Japan price anchors every path
    cutover: Option<NaiveDate>,
}

/// Trained Japan price model
#[derive(Debug, Clone)]
pub struct FittedJapanModel {
    /// Name of the model
    name: String,
    /// Basis used in training; predictions reuse it
    basis: PolynomialBasis,
    fit: OlsFit,
    quality: FitQuality,
    /// Cutover month and the actual Japan price there
    anchor: (NaiveDate, f64),
    /// Most recent complete row, excluded from training
    held_out: Option<(NaiveDate, f64, f64)>,
}

impl JapanPriceModel {
    /// Create a new Japan price model
    pub fn new(degree: PolynomialDegree) -> Self {
        let name = match degree {
            PolynomialDegree::Linear => "Japan HRC linear regression",
            PolynomialDegree::Quadratic => "Japan HRC quadratic regression",
        };
        Self {
            name: name.to_string(),
            basis: PolynomialBasis::new(degree),
            cutover: None,
        }
    }

    /// Anchor forecasts at a fixed month instead of the last training month
    pub fn with_cutover(mut self, cutover: Option<NaiveDate>) -> Self {
        self.cutover = cutover;
        self
    }
}

impl ForecastModel for JapanPriceModel {
    type Input = PriceHistory;
    type Trained = FittedJapanModel;

    /// Train on complete China/Japan pairs.
    ///
    /// Rows with a missing price are dropped and the most recent remaining row
    /// is held out.
    fn train(&self, history: &PriceHistory) -> Result<FittedJapanModel> {
        let mut pairs = history.complete_pairs();
        let held_out = pairs.pop();

        let required = self.basis.width() + 2;
        if pairs.len() < required {
            return Err(ForecastError::InsufficientData(format!(
                "Japan regression needs at least {} complete pairs after the hold-out, got {}",
                required,
                pairs.len()
            )));
        }

        let features: Vec<Vec<f64>> = pairs.iter().map(|(_, c, _)| self.basis.expand(*c)).collect();
        let target: Vec<f64> = pairs.iter().map(|(_, _, j)| *j).collect();

        let fit = fit_ols(&features, &target)?;
        let quality = fit_quality(&fit.fitted, &target)?;

        let cutover = match self.cutover {
            Some(month) => month,
            None => pairs[pairs.len() - 1].0,
        };
        let anchor_price = pairs
            .iter()
            .find(|(month, _, _)| *month == cutover)
            .map(|(_, _, japan)| *japan)
            .ok_or_else(|| {
                ForecastError::DataError(format!(
                    "No Japan price at cutover month {} in the training window",
                    cutover
                ))
            })?;

        info!(
            model = %self.name,
            observations = quality.observations,
            r_squared = quality.r_squared,
            %cutover,
            "fitted Japan price model"
        );

        Ok(FittedJapanModel {
            name: self.name.clone(),
            basis: self.basis,
            fit,
            quality,
            anchor: (cutover, anchor_price),
            held_out,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedJapanModel {
    /// Basis fitted during training
    pub fn basis(&self) -> PolynomialBasis {
        self.basis
    }

    /// Regression intercept
    pub fn intercept(&self) -> f64 {
        self.fit.intercept
    }

    /// Coefficients on `x` (and `x^2` for the quadratic basis)
    pub fn coefficients(&self) -> &[f64] {
        &self.fit.coefficients
    }

    /// Cutover `(month, actual Japan price)`
    pub fn anchor(&self) -> (NaiveDate, f64) {
        self.anchor
    }

    /// Held-out `(month, china, japan)` row
    pub fn held_out(&self) -> Option<(NaiveDate, f64, f64)> {
        self.held_out
    }
}

impl TrainedRegression for FittedJapanModel {
    type Row = f64;

    fn predict(&self, china_prices: &[f64]) -> Result<Vec<f64>> {
        Ok(china_prices
            .iter()
            .map(|c| self.fit.predict_row(&self.basis.expand(*c)))
            .collect())
    }

    fn fit_quality(&self) -> &FitQuality {
        &self.quality
    }

    fn name(&self) -> &str {
        &self.name
    }
}
