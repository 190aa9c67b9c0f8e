//! Pipeline configuration loaded from TOML

use crate::error::{ForecastError, Result};
use crate::models::{InformationCriterion, PolynomialDegree};
use crate::transform::LogShiftPolicy;
use crate::utils::{format_month, is_month_start};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for one pipeline invocation
///
/// Every field has a default, so an empty TOML document is a valid config.
/// Months are written as quoted `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Horizon used when a request does not name one
    pub default_horizon_months: usize,
    /// First forecast month; must follow the last panel month
    pub forecast_start: Option<NaiveDate>,
    pub var: VarConfig,
    pub china: ChinaConfig,
    pub japan: JapanConfig,
    pub output: OutputConfig,
}

/// Vector autoregression settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VarConfig {
    /// Largest candidate lag scored during selection
    pub max_lags: usize,
    /// Lag actually fitted
    pub lag_order: usize,
    /// Criterion used to report the preferred lag
    pub criterion: InformationCriterion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChinaConfig {
    pub log_shift: LogShiftPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JapanConfig {
    pub degree: PolynomialDegree,
    /// Month whose actual Japan price anchors the Japan paths
    pub cutover: Option<NaiveDate>,
    /// Chart history shows Japan prices strictly after this month
    pub history_start: Option<NaiveDate>,
}

/// Forecast table settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Keep only rows strictly after this month
    pub table_after: Option<NaiveDate>,
    /// Drop the anchor month from the table
    pub exclude_anchor: bool,
    /// `strftime` pattern of the month label
    pub month_format: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_horizon_months: 17,
            forecast_start: None,
            var: VarConfig::default(),
            china: ChinaConfig::default(),
            japan: JapanConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for VarConfig {
    fn default() -> Self {
        Self {
            max_lags: 12,
            lag_order: 4,
            criterion: InformationCriterion::Aic,
        }
    }
}

impl Default for ChinaConfig {
    fn default() -> Self {
        Self {
            log_shift: LogShiftPolicy::Training,
        }
    }
}

impl Default for JapanConfig {
    fn default() -> Self {
        Self {
            degree: PolynomialDegree::Linear,
            cutover: None,
            history_start: NaiveDate::from_ymd_opt(2006, 8, 1),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            table_after: None,
            exclude_anchor: false,
            month_format: "%b-%y".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ForecastError::ConfigError(e.to_string()))
    }

    /// Check values that serde accepts but the pipeline cannot use
    pub fn validate(&self) -> Result<()> {
        if self.var.lag_order == 0 {
            return Err(ForecastError::ConfigError(
                "var.lag_order must be at least 1".to_string(),
            ));
        }
        if self.var.max_lags == 0 {
            return Err(ForecastError::ConfigError(
                "var.max_lags must be at least 1".to_string(),
            ));
        }

        let format = &self.output.month_format;
        if format.trim().is_empty() {
            return Err(ForecastError::ConfigError(
                "output.month_format must not be empty".to_string(),
            ));
        }
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(ForecastError::ConfigError(format!(
                "output.month_format '{}' is not a valid strftime pattern",
                format
            )));
        }
        format_month(NaiveDate::default(), format)?;

        let months = [
            ("forecast_start", self.forecast_start),
            ("japan.cutover", self.japan.cutover),
            ("japan.history_start", self.japan.history_start),
            ("output.table_after", self.output.table_after),
        ];
        for (name, month) in months {
            if let Some(m) = month {
                if !is_month_start(m) {
                    return Err(ForecastError::ConfigError(format!(
                        "{} must be the first day of a month, got {}",
                        name, m
                    )));
                }
            }
        }

        Ok(())
    }
}
