//! Ordinary least squares with an intercept

use crate::error::{ForecastError, Result};
use nalgebra::{DMatrix, DVector};
use statrs::statistics::Statistics;

/// Least-squares solution `y = intercept + X * coefficients`
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    /// In-sample fitted values
    pub fitted: Vec<f64>,
}

/// Smallest `1 - R^2` of a feature on the others before the fit is refused
const COLLINEARITY_TOLERANCE: f64 = 1e-10;

/// Whether a column has no usable variance
pub(crate) fn is_constant(values: &[f64]) -> bool {
    let scale = 1.0 + values.iter().mean().abs();
    values.len() < 2 || values.iter().std_dev() <= 1e-12 * scale
}

/// Fit `target` on `features` (one row per observation).
///
/// Columns are standardised before solving the normal equations and the
/// coefficients are mapped back to the original scale.
pub fn fit_ols(features: &[Vec<f64>], target: &[f64]) -> Result<OlsFit> {
    let n = features.len();
    if n != target.len() {
        return Err(ForecastError::DataError(format!(
            "Features have {} rows, target has {}",
            n,
            target.len()
        )));
    }

    let p = features.first().map_or(0, |r| r.len());
    if p == 0 {
        return Err(ForecastError::InvalidParameter(
            "Regression needs at least one feature".to_string(),
        ));
    }
    if features.iter().any(|r| r.len() != p) {
        return Err(ForecastError::DataError(
            "Feature rows have inconsistent widths".to_string(),
        ));
    }
    if n <= p + 1 {
        return Err(ForecastError::InsufficientData(format!(
            "Regression with {} features needs more than {} observations, got {}",
            p,
            p + 1,
            n
        )));
    }

    let x = DMatrix::from_fn(n, p, |i, j| features[i][j]);
    let means: Vec<f64> = (0..p).map(|j| x.column(j).iter().mean()).collect();
    let scales: Vec<f64> = (0..p).map(|j| x.column(j).iter().std_dev()).collect();

    for j in 0..p {
        let column: Vec<f64> = x.column(j).iter().copied().collect();
        if is_constant(&column) {
            return Err(ForecastError::DegenerateStatistics(format!(
                "Feature {} has zero variance",
                j
            )));
        }
    }

    let y_mean = target.iter().mean();
    let xs = DMatrix::from_fn(n, p, |i, j| (x[(i, j)] - means[j]) / scales[j]);
    let yc = DVector::from_iterator(n, target.iter().map(|y| y - y_mean));

    let xtx = xs.transpose() * &xs;
    let xty = xs.transpose() * &yc;

    let singular = || {
        ForecastError::DegenerateStatistics(
            "Design matrix is singular (collinear features)".to_string(),
        )
    };
    let chol = xtx.cholesky().ok_or_else(singular)?;

    // Squared pivots are (n - 1)(1 - R^2) of each column on the earlier ones
    let min_pivot = chol.l().diagonal().iter().copied().fold(f64::INFINITY, f64::min);
    if min_pivot * min_pivot < COLLINEARITY_TOLERANCE * (n - 1) as f64 {
        return Err(singular());
    }
    let beta_scaled = chol.solve(&xty);
    let beta = DVector::from_iterator(p, beta_scaled.iter().zip(&scales).map(|(b, s)| b / s));

    let intercept = y_mean - beta.iter().zip(&means).map(|(b, m)| b * m).sum::<f64>();
    let fitted = (&x * &beta).iter().map(|v| v + intercept).collect();

    Ok(OlsFit {
        intercept,
        coefficients: beta.iter().copied().collect(),
        fitted,
    })
}

impl OlsFit {
    /// Predict a single observation
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }
}
