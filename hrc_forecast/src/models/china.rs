//! China HRC price regression on log-transformed drivers

use crate::data::{Driver, DriverSet, HistoricalPanel};
use crate::error::Result;
use crate::metrics::{fit_quality, FitQuality};
use crate::models::ols::{fit_ols, OlsFit};
use crate::models::{ForecastModel, TrainedRegression};
use crate::transform::{LogShiftPolicy, LogTransform};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Linear model of the China HRC price on the nine log drivers
#[derive(Debug, Clone)]
pub struct ChinaPriceModel {
    /// Name of the model
    name: String,
    /// Where predict-time log shifts come from
    policy: LogShiftPolicy,
}

/// Trained China price model
#[derive(Debug, Clone)]
pub struct FittedChinaModel {
    /// Name of the model
    name: String,
    policy: LogShiftPolicy,
    /// Shift constants fitted on the historical drivers
    transform: LogTransform,
    fit: OlsFit,
    quality: FitQuality,
    /// Last historical month and price
    anchor: (NaiveDate, f64),
}

impl ChinaPriceModel {
    /// Create a new China price model
    pub fn new(policy: LogShiftPolicy) -> Self {
        Self {
            name: "China HRC log-driver regression".to_string(),
            policy,
        }
    }
}

impl Default for ChinaPriceModel {
    fn default() -> Self {
        Self::new(LogShiftPolicy::default())
    }
}

impl ForecastModel for ChinaPriceModel {
    type Input = HistoricalPanel;
    type Trained = FittedChinaModel;

    fn train(&self, panel: &HistoricalPanel) -> Result<FittedChinaModel> {
        let drivers = panel.drivers();
        let prices = panel.hrc_prices();

        let transform = LogTransform::fit(&drivers)?;
        let features: Vec<Vec<f64>> = transform
            .transform(&drivers)?
            .into_iter()
            .map(|row| row.to_vec())
            .collect();

        let fit = fit_ols(&features, &prices)?;
        let quality = fit_quality(&fit.fitted, &prices)?;
        info!(
            model = %self.name,
            observations = quality.observations,
            r_squared = quality.r_squared,
            rmse = quality.rmse,
            "fitted China price model"
        );

        let last = panel.last();
        Ok(FittedChinaModel {
            name: self.name.clone(),
            policy: self.policy,
            transform,
            fit,
            quality,
            anchor: (last.month, last.hrc_price),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedChinaModel {
    /// Slope on the log of a driver
    pub fn coefficient(&self, driver: Driver) -> f64 {
        self.fit.coefficients[driver.index()]
    }

    /// Regression intercept
    pub fn intercept(&self) -> f64 {
        self.fit.intercept
    }

    /// Log transform fitted on the training drivers
    pub fn log_transform(&self) -> &LogTransform {
        &self.transform
    }

    /// Last historical `(month, price)`, the splice point of every path
    pub fn anchor(&self) -> (NaiveDate, f64) {
        self.anchor
    }
}

impl TrainedRegression for FittedChinaModel {
    type Row = DriverSet;

    fn predict(&self, rows: &[DriverSet]) -> Result<Vec<f64>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let logs = match self.policy {
            LogShiftPolicy::Training => {
                let drifted = self.transform.out_of_range(rows);
                if !drifted.is_empty() {
                    warn!(
                        drivers = ?drifted,
                        "forecast drivers leave the training range of the log transform"
                    );
                }
                self.transform.transform(rows)?
            }
            LogShiftPolicy::PerFrame => LogTransform::fit(rows)?.transform(rows)?,
        };

        Ok(logs.iter().map(|row| self.fit.predict_row(row)).collect())
    }

    fn fit_quality(&self) -> &FitQuality {
        &self.quality
    }

    fn name(&self) -> &str {
        &self.name
    }
}
