//! Freight, duty and currency inputs of the landed-cost chain

use crate::{LandedCostError, Result};
use serde::{Deserialize, Serialize};

/// Per-origin inputs; money amounts are per tonne
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandedCostInputs {
    /// Sea freight ($/t)
    pub sea_freight: f64,
    /// Basic customs duty (% of CIF)
    pub basic_customs_duty_pct: f64,
    /// Antidumping duty ($/t)
    pub antidumping: f64,
    /// Minimum import price ($/t)
    pub mip: f64,
    /// Safeguard duty (% of landed value), reported only
    pub safeguard_duty_pct: f64,
    /// Safeguard duty actually charged ($/t)
    pub applicable_sgd: f64,
    /// LC and port charges ($/t)
    pub lc_port_charges: f64,
    /// INR per USD
    pub exchange_rate: f64,
    /// Port to city freight (Rs/t)
    pub port_to_city_freight: f64,
}

impl LandedCostInputs {
    /// Imports from China, with 7.5% basic customs duty
    pub fn china() -> Self {
        Self {
            basic_customs_duty_pct: 7.5,
            ..Self::japan()
        }
    }

    /// Imports from Japan, duty free
    pub fn japan() -> Self {
        Self {
            sea_freight: 30.0,
            basic_customs_duty_pct: 0.0,
            antidumping: 0.0,
            mip: 0.0,
            safeguard_duty_pct: 0.0,
            applicable_sgd: 0.0,
            lc_port_charges: 10.0,
            exchange_rate: 86.0,
            port_to_city_freight: 500.0,
        }
    }

    /// Reject non-finite amounts and a non-positive exchange rate
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("sea_freight", self.sea_freight),
            ("basic_customs_duty_pct", self.basic_customs_duty_pct),
            ("antidumping", self.antidumping),
            ("mip", self.mip),
            ("safeguard_duty_pct", self.safeguard_duty_pct),
            ("applicable_sgd", self.applicable_sgd),
            ("lc_port_charges", self.lc_port_charges),
            ("exchange_rate", self.exchange_rate),
            ("port_to_city_freight", self.port_to_city_freight),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(LandedCostError::InvalidInput(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }

        if self.exchange_rate <= 0.0 {
            return Err(LandedCostError::InvalidInput(format!(
                "Exchange rate must be greater than zero, got {}",
                self.exchange_rate
            )));
        }

        Ok(())
    }
}
