//! # Landed Cost
//!
//! Landed price in India of imported hot-rolled coil, from an FOB price
//! through freight, insurance, customs duties and port charges to the
//! delivered city-market price in rupees.

use thiserror::Error;

pub mod calculator;
pub mod inputs;

pub use calculator::{calculate, LandedCostBreakdown};
pub use inputs::LandedCostInputs;

/// Errors that can occur in landed-cost calculations
#[derive(Error, Debug, PartialEq)]
pub enum LandedCostError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for landed-cost calculations
pub type Result<T> = std::result::Result<T, LandedCostError>;
