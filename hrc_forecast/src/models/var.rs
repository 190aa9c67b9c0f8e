//! Vector autoregression on differenced panel data
//!
//! Every equation regresses one variable on an intercept and the previous
//! `p` observations of all variables, estimated jointly by least squares.
//! Lag-order selection compares information criteria on a common estimation
//! sample and is informational: fitting always uses the configured lag.

use crate::error::{ForecastError, Result};
use crate::models::ols::is_constant;
use crate::models::ForecastModel;
use crate::utils::month_range;
use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Criterion used to report a preferred lag order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InformationCriterion {
    #[default]
    Aic,
    Bic,
    Hqic,
    Fpe,
}

/// Information criteria for one candidate lag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LagScore {
    pub lag: usize,
    pub aic: f64,
    pub bic: f64,
    pub hqic: f64,
    pub fpe: f64,
}

impl LagScore {
    /// Score under a given criterion
    pub fn get(&self, criterion: InformationCriterion) -> f64 {
        match criterion {
            InformationCriterion::Aic => self.aic,
            InformationCriterion::Bic => self.bic,
            InformationCriterion::Hqic => self.hqic,
            InformationCriterion::Fpe => self.fpe,
        }
    }
}

/// Outcome of lag-order selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagSelection {
    /// Largest candidate lag considered
    pub max_lags: usize,
    /// Criterion used for `selected`
    pub criterion: InformationCriterion,
    /// Scores of the feasible candidates, in lag order
    pub scores: Vec<LagScore>,
    /// Candidates with more parameters than observations
    pub skipped: Vec<usize>,
    /// Lag minimising `criterion`
    pub selected: usize,
}

impl LagSelection {
    /// Lag minimising an arbitrary criterion
    pub fn best(&self, criterion: InformationCriterion) -> Option<usize> {
        self.scores
            .iter()
            .filter(|s| s.get(criterion).is_finite())
            .min_by(|a, b| a.get(criterion).total_cmp(&b.get(criterion)))
            .map(|s| s.lag)
    }
}

/// Vector autoregression with fixed lag settings
#[derive(Debug, Clone)]
pub struct VarModel {
    /// Name of the model
    name: String,
    /// Largest lag considered during selection
    max_lags: usize,
    /// Lag used for fitting
    lag_order: usize,
    /// Criterion reported by selection
    criterion: InformationCriterion,
}

/// Trained vector autoregression
#[derive(Debug, Clone)]
pub struct FittedVar {
    /// Name of the model
    name: String,
    /// Lag order (p)
    lag_order: usize,
    /// Number of variables (k)
    variables: usize,
    /// Intercept per equation
    intercept: DVector<f64>,
    /// `A_1 .. A_p`, each k x k with rows as equations
    coefficients: Vec<DMatrix<f64>>,
    /// Degrees-of-freedom adjusted residual covariance
    sigma_u: DMatrix<f64>,
    /// Observations used in estimation
    nobs: usize,
}

/// Differenced forecast with its month keys
#[derive(Debug, Clone, PartialEq)]
pub struct VarForecast {
    pub months: Vec<NaiveDate>,
    /// One row per step, in the column order of the training data
    pub differences: Vec<Vec<f64>>,
}

/// Least-squares estimate shared by selection and fitting
struct Estimate {
    /// (1 + k p) x k, first row is the intercept
    beta: DMatrix<f64>,
    /// Maximum-likelihood residual covariance
    sigma_mle: DMatrix<f64>,
    /// Residual cross-product divided by `nobs - (1 + k p)`
    sigma_u: DMatrix<f64>,
    nobs: usize,
}

fn to_matrix(data: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let k = data.first().map_or(0, |r| r.len());
    if k == 0 {
        return Err(ForecastError::InsufficientData(
            "VAR input has no observations".to_string(),
        ));
    }
    if data.iter().any(|r| r.len() != k) {
        return Err(ForecastError::DataError(
            "VAR observations have inconsistent widths".to_string(),
        ));
    }
    Ok(DMatrix::from_fn(data.len(), k, |i, j| data[i][j]))
}

fn check_variance(y: &DMatrix<f64>) -> Result<()> {
    for j in 0..y.ncols() {
        let column: Vec<f64> = y.column(j).iter().copied().collect();
        if is_constant(&column) {
            return Err(ForecastError::DegenerateStatistics(format!(
                "VAR variable {} is constant",
                j
            )));
        }
    }
    Ok(())
}

/// Log-determinant of a symmetric positive definite matrix
fn log_det(m: &DMatrix<f64>) -> Option<f64> {
    let chol = m.clone().cholesky()?;
    Some(2.0 * chol.l().diagonal().iter().map(|d| d.ln()).sum::<f64>())
}

/// Estimate a VAR(p) on observations `offset + p ..` of `y`
fn estimate_var(y: &DMatrix<f64>, p: usize, offset: usize) -> Result<Estimate> {
    let k = y.ncols();
    let start = offset + p;
    let nobs = y.nrows().saturating_sub(start);
    let regressors = 1 + k * p;

    if nobs <= regressors {
        return Err(ForecastError::InsufficientData(format!(
            "VAR({}) with {} variables needs more than {} usable observations, got {}",
            p, k, regressors, nobs
        )));
    }

    let z = DMatrix::from_fn(nobs, regressors, |i, c| {
        if c == 0 {
            return 1.0;
        }
        let lag = (c - 1) / k + 1;
        let var = (c - 1) % k;
        y[(start + i - lag, var)]
    });
    let target = y.rows(start, nobs).into_owned();

    let ztz = z.transpose() * &z;
    let zty = z.transpose() * &target;
    let beta = ztz
        .cholesky()
        .ok_or_else(|| {
            ForecastError::DegenerateStatistics(format!(
                "VAR({}) regressor matrix is singular",
                p
            ))
        })?
        .solve(&zty);

    let residuals = &target - &z * &beta;
    let cross = residuals.transpose() * &residuals;

    Ok(Estimate {
        beta,
        sigma_mle: cross.clone() / nobs as f64,
        sigma_u: cross / (nobs - regressors) as f64,
        nobs,
    })
}

impl VarModel {
    /// Create a new VAR model
    pub fn new(max_lags: usize, lag_order: usize) -> Result<Self> {
        if lag_order == 0 {
            return Err(ForecastError::InvalidParameter(
                "VAR lag order must be at least 1".to_string(),
            ));
        }
        if max_lags == 0 {
            return Err(ForecastError::InvalidParameter(
                "Maximum candidate lag must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("VAR({})", lag_order),
            max_lags,
            lag_order,
            criterion: InformationCriterion::default(),
        })
    }

    /// Use a different criterion to report the preferred lag
    pub fn with_criterion(mut self, criterion: InformationCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Lag used for fitting
    pub fn lag_order(&self) -> usize {
        self.lag_order
    }

    /// Largest candidate lag
    pub fn max_lags(&self) -> usize {
        self.max_lags
    }

    /// Score every candidate lag `1..=max_lags` on a common sample.
    ///
    /// The first `max_lags` observations are held back for every candidate so
    /// that all scores are computed on the same observations.
    pub fn select_order(&self, data: &[Vec<f64>]) -> Result<LagSelection> {
        let y = to_matrix(data)?;
        check_variance(&y)?;
        let k = y.ncols() as f64;

        let mut scores = Vec::with_capacity(self.max_lags);
        let mut skipped = Vec::new();

        for p in 1..=self.max_lags {
            let estimate = match estimate_var(&y, p, self.max_lags - p) {
                Ok(e) => e,
                Err(e) => {
                    warn!(lag = p, error = %e, "skipping infeasible candidate lag");
                    skipped.push(p);
                    continue;
                }
            };

            let Some(ld) = log_det(&estimate.sigma_mle) else {
                warn!(lag = p, "residual covariance is not positive definite");
                skipped.push(p);
                continue;
            };

            let n = estimate.nobs as f64;
            let free_params = p as f64 * k * k + k;
            let df_model = k * p as f64 + 1.0;

            let score = LagScore {
                lag: p,
                aic: ld + 2.0 / n * free_params,
                bic: ld + n.ln() / n * free_params,
                hqic: ld + 2.0 * n.ln().ln() / n * free_params,
                fpe: ((n + df_model) / (n - df_model)).powf(k) * ld.exp(),
            };
            info!(
                lag = p,
                aic = score.aic,
                bic = score.bic,
                hqic = score.hqic,
                fpe = score.fpe,
                "lag order candidate"
            );
            scores.push(score);
        }

        let mut selection = LagSelection {
            max_lags: self.max_lags,
            criterion: self.criterion,
            scores,
            skipped,
            selected: 0,
        };

        selection.selected = selection.best(self.criterion).ok_or_else(|| {
            ForecastError::InsufficientData(format!(
                "No candidate lag up to {} can be estimated from {} observations",
                self.max_lags,
                data.len()
            ))
        })?;

        info!(
            criterion = ?self.criterion,
            selected = selection.selected,
            fitted = self.lag_order,
            "lag order selection"
        );

        Ok(selection)
    }
}

impl ForecastModel for VarModel {
    type Input = [Vec<f64>];
    type Trained = FittedVar;

    fn train(&self, data: &[Vec<f64>]) -> Result<FittedVar> {
        if data.len() < self.lag_order + 1 {
            return Err(ForecastError::InsufficientData(format!(
                "VAR({}) needs at least {} observations, got {}",
                self.lag_order,
                self.lag_order + 1,
                data.len()
            )));
        }

        let y = to_matrix(data)?;
        check_variance(&y)?;

        let k = y.ncols();
        let p = self.lag_order;
        let estimate = estimate_var(&y, p, 0)?;

        let intercept = estimate.beta.row(0).transpose();
        let coefficients = (0..p)
            .map(|lag| {
                DMatrix::from_fn(k, k, |eq, var| estimate.beta[(1 + lag * k + var, eq)])
            })
            .collect();

        Ok(FittedVar {
            name: self.name.clone(),
            lag_order: p,
            variables: k,
            intercept,
            coefficients,
            sigma_u: estimate.sigma_u,
            nobs: estimate.nobs,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedVar {
    /// Lag order (p)
    pub fn lag_order(&self) -> usize {
        self.lag_order
    }

    /// Number of variables (k)
    pub fn variables(&self) -> usize {
        self.variables
    }

    /// Observations used in estimation
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    /// Intercept per equation
    pub fn intercept(&self) -> Vec<f64> {
        self.intercept.iter().copied().collect()
    }

    /// Coefficient matrix for `lag` (1-based), rows are equations
    pub fn coefficient(&self, lag: usize) -> Option<&DMatrix<f64>> {
        lag.checked_sub(1).and_then(|i| self.coefficients.get(i))
    }

    /// Residual covariance
    pub fn sigma_u(&self) -> &DMatrix<f64> {
        &self.sigma_u
    }

    /// Name of the model
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterate the fitted dynamics `steps` ahead of `history`.
    ///
    /// Only the most recent `lag_order` rows of `history` seed the recursion.
    pub fn forecast(&self, history: &[Vec<f64>], steps: usize) -> Result<Vec<Vec<f64>>> {
        let p = self.lag_order;
        if history.len() < p {
            return Err(ForecastError::InsufficientData(format!(
                "Forecasting needs the last {} observations, got {}",
                p,
                history.len()
            )));
        }
        if history.iter().any(|r| r.len() != self.variables) {
            return Err(ForecastError::DataError(format!(
                "Forecast seed rows must have {} variables",
                self.variables
            )));
        }

        let mut window: Vec<DVector<f64>> = history[history.len() - p..]
            .iter()
            .map(|r| DVector::from_column_slice(r))
            .collect();
        let mut forecasts = Vec::with_capacity(steps);

        for _ in 0..steps {
            let mut next = self.intercept.clone();
            for (lag, a) in self.coefficients.iter().enumerate() {
                next += a * &window[window.len() - 1 - lag];
            }
            forecasts.push(next.iter().copied().collect());
            window.remove(0);
            window.push(next);
        }

        Ok(forecasts)
    }

    /// Forecast with monthly timestamps starting at `start`
    pub fn forecast_from(
        &self,
        history: &[Vec<f64>],
        steps: usize,
        start: NaiveDate,
    ) -> Result<VarForecast> {
        Ok(VarForecast {
            months: month_range(start, steps)?,
            differences: self.forecast(history, steps)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    /// Bivariate VAR(1) with seeded Gaussian noise
    fn simulate(n: usize) -> Vec<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(17);
        let noise = Normal::new(0.0, 0.3).unwrap();
        let mut rows = vec![vec![0.0, 0.0]];
        for t in 1..n {
            let prev = &rows[t - 1];
            rows.push(vec![
                0.1 + 0.5 * prev[0] + 0.1 * prev[1] + noise.sample(&mut rng),
                -0.2 + 0.2 * prev[0] + 0.3 * prev[1] + noise.sample(&mut rng),
            ]);
        }
        rows
    }

    #[test]
    fn test_rejects_zero_lag() {
        assert!(VarModel::new(4, 0).is_err());
        assert!(VarModel::new(0, 1).is_err());
    }

    #[test]
    fn test_insufficient_rows() {
        let model = VarModel::new(2, 4).unwrap();
        let data = simulate(4);
        assert!(matches!(
            model.train(&data),
            Err(ForecastError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_constant_column_is_degenerate() {
        let model = VarModel::new(2, 1).unwrap();
        let data: Vec<Vec<f64>> = simulate(40).into_iter().map(|r| vec![r[0], 3.0]).collect();
        assert!(matches!(
            model.train(&data),
            Err(ForecastError::DegenerateStatistics(_))
        ));
    }

    #[test]
    fn test_recovers_var1_dynamics() {
        let model = VarModel::new(3, 1).unwrap();
        let fitted = model.train(&simulate(400)).unwrap();
        let a1 = fitted.coefficient(1).unwrap();
        assert_abs_diff_eq!(a1[(0, 0)], 0.5, epsilon = 0.1);
        assert_abs_diff_eq!(a1[(1, 1)], 0.3, epsilon = 0.1);
        assert!(fitted.coefficient(2).is_none());
        assert_eq!(fitted.nobs(), 399);
    }

    #[test]
    fn test_forecast_uses_last_lag_rows() {
        let model = VarModel::new(2, 2).unwrap();
        let data = simulate(120);
        let fitted = model.train(&data).unwrap();

        let full = fitted.forecast(&data, 5).unwrap();
        let tail = fitted.forecast(&data[data.len() - 2..], 5).unwrap();
        assert_eq!(full, tail);
        assert_eq!(full.len(), 5);
        assert!(fitted.forecast(&data[..1], 1).is_err());
        assert!(fitted.forecast(&data, 0).unwrap().is_empty());
    }

    #[test]
    fn test_select_order_reports_every_candidate() {
        let model = VarModel::new(4, 2).unwrap();
        let selection = model.select_order(&simulate(200)).unwrap();
        assert_eq!(selection.scores.len(), 4);
        assert!(selection.skipped.is_empty());
        assert!((1..=4).contains(&selection.selected));
        assert_eq!(
            selection.best(InformationCriterion::Aic),
            Some(selection.selected)
        );
    }

    #[test]
    fn test_select_order_skips_infeasible_lags() {
        let model = VarModel::new(12, 1).unwrap();
        let selection = model.select_order(&simulate(30)).unwrap();
        assert!(!selection.skipped.is_empty());
        assert!(selection.scores.iter().all(|s| s.aic.is_finite()));
    }
}
