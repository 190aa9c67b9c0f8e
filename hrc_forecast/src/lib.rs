//! # HRC Forecast
//!
//! Scenario forecasts of China and Japan hot-rolled-coil (HRC) steel prices
//! from a monthly panel of macroeconomic drivers.
//!
//! ## Pipeline
//!
//! - Differencing and re-integration of the driver panel ([`transform`])
//! - Vector autoregression with information-criterion lag scoring ([`models::var`])
//! - China price regression on log-transformed drivers ([`models::china`])
//! - Japan price regression on the China price ([`models::japan`])
//! - Base, upside and downside scenarios sharing one set of fitted models ([`scenario`])
//! - A month-keyed forecast table and plot-ready series ([`output`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hrc_forecast::{DataLoader, ForecastPipeline, ForecastRequest, PipelineConfig};
//!
//! # fn main() -> hrc_forecast::Result<()> {
//! let panel = DataLoader::panel_from_csv("china_drivers.csv")?;
//! let prices = DataLoader::prices_from_csv("china_japan_hrc.csv")?;
//!
//! let pipeline = ForecastPipeline::new(PipelineConfig::default())?;
//! let output = pipeline.generate_forecast(&panel, &prices, &ForecastRequest::default())?;
//!
//! for row in output.table.rows() {
//!     println!("{} {:?} {:?}", row.label, row.china, row.japan);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod scenario;
pub mod transform;
pub mod utils;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::{DataLoader, Driver, DriverSet, HistoricalPanel, PanelRow, PricePair, PriceHistory};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{ForecastModel, ForecastPath, TrainedRegression};
pub use crate::output::{ChartData, ForecastRow, ForecastTable};
pub use crate::pipeline::{ForecastOutput, ForecastPipeline, ForecastRequest};
pub use crate::scenario::{Country, DriverOverrides, Scenario, ScenarioDrivers, ScenarioSet};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
