//! End-to-end scenario forecast: VAR drivers, China prices, Japan prices

use crate::config::PipelineConfig;
use crate::data::{DriverSet, HistoricalPanel, PriceHistory};
use crate::error::{ForecastError, Result};
use crate::metrics::FitQuality;
use crate::models::{
    ChinaPriceModel, FittedChinaModel, FittedJapanModel, ForecastModel, ForecastPath,
    JapanPriceModel, LagSelection, TrainedRegression, VarModel,
};
use crate::output::{ChartData, ForecastTable};
use crate::scenario::{apply_scenario, Country, DriverOverrides, Scenario, ScenarioDrivers, ScenarioSet};
use crate::transform::{difference_panel, integrate_columns};
use crate::utils::next_month;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Caller inputs of one forecast run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub upside: ScenarioDrivers,
    pub downside: ScenarioDrivers,
    /// Months after the anchor; `None` uses the configured default
    pub horizon_months: Option<usize>,
    /// Countries shown in the chart
    pub countries: Vec<Country>,
    /// Skip the Japan model when Japan is not selected
    pub skip_unselected: bool,
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            upside: ScenarioDrivers::upside(),
            downside: ScenarioDrivers::downside(),
            horizon_months: None,
            countries: Country::ALL.to_vec(),
            skip_unselected: false,
        }
    }
}

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    /// China paths, anchored at the last panel month
    pub china: ScenarioSet<ForecastPath>,
    /// Japan paths, anchored at the cutover month
    pub japan: Option<ScenarioSet<ForecastPath>>,
    /// VAR-forecast driver levels, one per forecast month
    pub drivers: Vec<(NaiveDate, DriverSet)>,
    pub chart: ChartData,
    pub table: ForecastTable,
    /// `None` when no candidate lag could be scored
    pub lag_selection: Option<LagSelection>,
    pub china_fit: FitQuality,
    pub japan_fit: Option<FitQuality>,
}

/// Stateless pipeline; every call refits all models from its inputs
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: PipelineConfig,
}

impl ForecastPipeline {
    /// Create a pipeline after validating its configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full forecast.
    ///
    /// Either every requested path is returned or the call fails.
    pub fn generate_forecast(
        &self,
        panel: &HistoricalPanel,
        prices: &PriceHistory,
        request: &ForecastRequest,
    ) -> Result<ForecastOutput> {
        let horizon = request
            .horizon_months
            .unwrap_or(self.config.default_horizon_months);
        let anchor = panel.last();
        let start = self.forecast_start(anchor.month)?;
        info!(horizon, %start, anchor = %anchor.month, "generating HRC forecast");

        let (drivers, lag_selection) = self.forecast_drivers(panel, horizon, start)?;
        let months: Vec<NaiveDate> = drivers.iter().map(|(m, _)| *m).collect();
        let driver_rows: Vec<DriverSet> = drivers.iter().map(|(_, d)| *d).collect();

        let china_model = ChinaPriceModel::new(self.config.china.log_shift).train(panel)?;
        let china = self.china_paths(&china_model, &months, &driver_rows, request)?;

        let run_japan = !request.skip_unselected || request.countries.contains(&Country::Japan);
        let japan_fitted = if run_japan {
            let model = JapanPriceModel::new(self.config.japan.degree)
                .with_cutover(self.config.japan.cutover)
                .train(prices)?;
            let paths = japan_paths(&model, &china)?;
            Some((model, paths))
        } else {
            debug!("Japan not selected, skipping Japan model");
            None
        };

        let japan = japan_fitted.as_ref().map(|(_, paths)| paths);
        let table = ForecastTable::assemble(&china.base, japan.map(|j| &j.base), &self.config.output)?;
        let chart = ChartData::build(
            panel,
            prices,
            &china,
            japan,
            &request.countries,
            self.config.japan.history_start,
        );

        Ok(ForecastOutput {
            china_fit: *china_model.fit_quality(),
            japan_fit: japan_fitted.as_ref().map(|(m, _)| *m.fit_quality()),
            japan: japan_fitted.map(|(_, paths)| paths),
            china,
            drivers,
            chart,
            table,
            lag_selection,
        })
    }

    /// First forecast month, checked against the configured start
    fn forecast_start(&self, last_month: NaiveDate) -> Result<NaiveDate> {
        let start = next_month(last_month)?;
        match self.config.forecast_start {
            Some(configured) if configured != start => Err(ForecastError::InvalidParameter(format!(
                "forecast_start {} must be the month after the last panel month {}",
                configured, last_month
            ))),
            _ => Ok(start),
        }
    }

    /// Fit the VAR on differences and integrate its forecast back to levels
    fn forecast_drivers(
        &self,
        panel: &HistoricalPanel,
        horizon: usize,
        start: NaiveDate,
    ) -> Result<(Vec<(NaiveDate, DriverSet)>, Option<LagSelection>)> {
        let differenced = difference_panel(panel)?;
        let var = VarModel::new(self.config.var.max_lags, self.config.var.lag_order)?
            .with_criterion(self.config.var.criterion);

        let lag_selection = match var.select_order(differenced.rows()) {
            Ok(selection) => Some(selection),
            Err(e) => {
                warn!(error = %e, "lag order selection failed");
                None
            }
        };

        let fitted = var.train(differenced.rows())?;
        let forecast = fitted.forecast_from(differenced.rows(), horizon, start)?;
        let levels = integrate_columns(&panel.last().to_vec(), &forecast.differences)?;

        let drivers = forecast
            .months
            .into_iter()
            .zip(levels)
            .map(|(month, row)| Ok((month, DriverSet::from_slice(&row[1..])?)))
            .collect::<Result<Vec<_>>>()?;

        Ok((drivers, lag_selection))
    }

    fn china_paths(
        &self,
        model: &FittedChinaModel,
        months: &[NaiveDate],
        drivers: &[DriverSet],
        request: &ForecastRequest,
    ) -> Result<ScenarioSet<ForecastPath>> {
        let (anchor_month, anchor_price) = model.anchor();

        let paths = ScenarioSet::try_from_fn(|scenario| {
            let overrides = match scenario {
                Scenario::Base => DriverOverrides::new(),
                Scenario::Upside => request.upside.overrides()?,
                Scenario::Downside => request.downside.overrides()?,
            };
            let predicted = apply_scenario(model, drivers, &overrides)?;
            debug!(%scenario, months = predicted.len(), "China scenario path");
            ForecastPath::anchored(anchor_month, anchor_price, months, &predicted)
        })?;

        paths.ensure_aligned()?;
        Ok(paths)
    }
}

/// Japan paths from the China paths, starting at the cutover month.
///
/// The China path must cover the month after the cutover, otherwise the Japan
/// path would skip months.
fn japan_paths(
    model: &FittedJapanModel,
    china: &ScenarioSet<ForecastPath>,
) -> Result<ScenarioSet<ForecastPath>> {
    let (cutover, anchor_price) = model.anchor();
    let following = next_month(cutover)?;

    let paths = ScenarioSet::try_from_fn(|scenario| {
        let (months, china_prices) = china.get(scenario).after(cutover);
        if let Some(first) = months.first().copied() {
            if first != following {
                return Err(ForecastError::DataError(format!(
                    "Japan cutover {} is not followed by the China path, which starts at {}",
                    cutover, first
                )));
            }
        }
        let predicted = model.predict(&china_prices)?;
        debug!(%scenario, months = predicted.len(), "Japan scenario path");
        ForecastPath::anchored(cutover, anchor_price, &months, &predicted)
    })?;

    paths.ensure_aligned()?;
    Ok(paths)
}
