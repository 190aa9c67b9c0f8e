//! Error types for the hrc_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the hrc_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// An input table lacks a column the schema requires
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Too few observations for the requested fit or lag order
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Zero variance, singular design matrix or a non-positive log argument
    #[error("Degenerate statistics: {0}")]
    DegenerateStatistics(String),

    /// Scenario paths disagree on their timestamps or length
    #[error("Scenario misalignment: {0}")]
    ScenarioMisalignment(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from loading or validating configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from CSV serialization
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::JsonError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
