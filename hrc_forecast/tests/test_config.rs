use chrono::NaiveDate;
use hrc_forecast::models::{InformationCriterion, PolynomialDegree};
use hrc_forecast::transform::LogShiftPolicy;
use hrc_forecast::{ForecastError, PipelineConfig};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

const FULL: &str = r#"
default_horizon_months = 12
forecast_start = "2024-11-01"

[var]
max_lags = 8
lag_order = 3
criterion = "hqic"

[china]
log_shift = "per_frame"

[japan]
degree = "quadratic"
cutover = "2025-01-01"

[output]
table_after = "2025-03-01"
exclude_anchor = true
month_format = "%Y-%m"
"#;

#[test]
fn test_full_document() {
    let config = PipelineConfig::from_toml_str(FULL).unwrap();

    assert_eq!(config.default_horizon_months, 12);
    assert_eq!(config.forecast_start, NaiveDate::from_ymd_opt(2024, 11, 1));
    assert_eq!(config.var.max_lags, 8);
    assert_eq!(config.var.lag_order, 3);
    assert_eq!(config.var.criterion, InformationCriterion::Hqic);
    assert_eq!(config.china.log_shift, LogShiftPolicy::PerFrame);
    assert_eq!(config.japan.degree, PolynomialDegree::Quadratic);
    assert_eq!(config.japan.cutover, NaiveDate::from_ymd_opt(2025, 1, 1));
    assert_eq!(config.japan.history_start, NaiveDate::from_ymd_opt(2006, 8, 1));
    assert_eq!(config.output.table_after, NaiveDate::from_ymd_opt(2025, 3, 1));
    assert!(config.output.exclude_anchor);
    assert_eq!(config.output.month_format, "%Y-%m");
}

#[test]
fn test_partial_document_keeps_defaults() {
    let config = PipelineConfig::from_toml_str("[var]\nlag_order = 2\n").unwrap();
    assert_eq!(config.var.lag_order, 2);
    assert_eq!(config.var.max_lags, 12);
    assert_eq!(config.default_horizon_months, 17);
    assert_eq!(config.china.log_shift, LogShiftPolicy::Training);
}

#[test]
fn test_from_file_round_trip() {
    let config = PipelineConfig::from_toml_str(FULL).unwrap();

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", config.to_toml_string().unwrap()).unwrap();
    file.flush().unwrap();

    let loaded = PipelineConfig::from_file(file.path()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_rejects_invalid_values() {
    let zero_lag = PipelineConfig::from_toml_str("[var]\nlag_order = 0\n");
    assert!(matches!(zero_lag, Err(ForecastError::ConfigError(_))));

    let zero_max = PipelineConfig::from_toml_str("[var]\nmax_lags = 0\n");
    assert!(matches!(zero_max, Err(ForecastError::ConfigError(_))));

    let empty_format = PipelineConfig::from_toml_str("[output]\nmonth_format = \"\"\n");
    assert!(matches!(empty_format, Err(ForecastError::ConfigError(_))));

    let mid_month = PipelineConfig::from_toml_str("forecast_start = \"2024-11-15\"\n");
    assert!(matches!(mid_month, Err(ForecastError::ConfigError(_))));
}

#[test]
fn test_rejects_month_format_with_time_fields() {
    for format in ["%H:%M", "%b-%y %z"] {
        let text = format!("[output]\nmonth_format = \"{}\"\n", format);
        let result = PipelineConfig::from_toml_str(&text);
        assert!(matches!(result, Err(ForecastError::ConfigError(_))), "{}", format);
    }
}

#[test]
fn test_rejects_unknown_keys_and_bad_types() {
    let unknown = PipelineConfig::from_toml_str("[var]\nlags = 3\n");
    assert!(matches!(unknown, Err(ForecastError::ConfigError(_))));

    let bad_criterion = PipelineConfig::from_toml_str("[var]\ncriterion = \"r2\"\n");
    assert!(bad_criterion.is_err());
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        PipelineConfig::from_file("no_such_config.toml"),
        Err(ForecastError::IoError(_))
    ));
}
