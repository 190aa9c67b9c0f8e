//! # Steel Outlook
//!
//! `steel_outlook` ties the HRC price forecast to the India landed-cost
//! chain: pick a month from the forecast table, take the FOB price for a
//! country and run it through freight, duties and port charges.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use steel_outlook::hrc_forecast::config::OutputConfig;
//! use steel_outlook::hrc_forecast::{Country, ForecastPath, ForecastTable};
//! use steel_outlook::landed_cost::LandedCostInputs;
//!
//! let month = |m| NaiveDate::from_ymd_opt(2025, m, 1).unwrap();
//! let china = ForecastPath::new(vec![month(4), month(5)], vec![480.0, 490.0]).unwrap();
//! let table = ForecastTable::assemble(&china, None, &OutputConfig::default()).unwrap();
//!
//! let cost = steel_outlook::landed_price_for(
//!     &table,
//!     "May-25",
//!     Country::China,
//!     &LandedCostInputs::china(),
//! )
//! .unwrap();
//! assert_eq!(cost.fob, 490.0);
//! assert!(cost.market_price_inr > cost.port_price_inr);
//! ```

pub use hrc_forecast;
pub use landed_cost;

use hrc_forecast::{Country, ForecastError, ForecastTable};
use landed_cost::{LandedCostBreakdown, LandedCostError, LandedCostInputs};
use thiserror::Error;

/// Errors from combining a forecast with the landed-cost chain
#[derive(Error, Debug)]
pub enum OutlookError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    LandedCost(#[from] LandedCostError),

    /// The table has no price for that month and country
    #[error("No {country} forecast for {label}")]
    MissingPrice { label: String, country: Country },
}

/// Result type for combined forecast and landed-cost operations
pub type Result<T> = std::result::Result<T, OutlookError>;

/// Landed cost in India of the forecast FOB price for `month_label`
pub fn landed_price_for(
    table: &ForecastTable,
    month_label: &str,
    country: Country,
    inputs: &LandedCostInputs,
) -> Result<LandedCostBreakdown> {
    let fob = table
        .fob_price(month_label, country)
        .ok_or_else(|| OutlookError::MissingPrice {
            label: month_label.to_string(),
            country,
        })?;
    Ok(landed_cost::calculate(fob, inputs)?)
}
