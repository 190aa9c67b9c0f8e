//! In-sample fit diagnostics for the price regressions

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Goodness of fit of a regression on its own training data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    /// Number of training observations
    pub observations: usize,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Coefficient of determination
    pub r_squared: f64,
}

/// Compare fitted values against the observations they were trained on
pub fn fit_quality(fitted: &[f64], actual: &[f64]) -> Result<FitQuality> {
    if fitted.len() != actual.len() || fitted.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "Fitted and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = fitted.len() as f64;

    let errors: Vec<f64> = fitted
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let sse = errors.iter().map(|e| e.powi(2)).sum::<f64>();
    let rmse = (sse / n).sqrt();

    let mape = actual
        .iter()
        .zip(errors.iter())
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
        .sum::<f64>()
        / n;

    let mean = actual.iter().mean();
    let sst = actual.iter().map(|a| (a - mean).powi(2)).sum::<f64>();
    let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 0.0 };

    Ok(FitQuality {
        observations: fitted.len(),
        mae,
        rmse,
        mape,
        r_squared,
    })
}

impl std::fmt::Display for FitQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Fit Quality ({} observations):", self.observations)?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  R2:    {:.4}", self.r_squared)?;
        Ok(())
    }
}
