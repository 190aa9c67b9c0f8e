//! The landed-cost chain

use crate::inputs::LandedCostInputs;
use crate::{LandedCostError, Result};
use serde::{Deserialize, Serialize};

/// Insurance as a share of CFR
const INSURANCE_RATE: f64 = 0.01;
/// Social welfare surcharge as a share of basic customs duty
const SOCIAL_WELFARE_RATE: f64 = 0.10;

/// Every intermediate amount of the chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandedCostBreakdown {
    /// FOB price at origin ($/t)
    pub fob: f64,
    /// Cost and freight ($/t)
    pub cfr: f64,
    pub insurance: f64,
    /// Assessable value ($/t)
    pub cif: f64,
    pub basic_customs_duty: f64,
    pub social_welfare_surcharge: f64,
    pub landed_value: f64,
    /// Reported, not added to the port price
    pub safeguard_duty: f64,
    /// Landed price at port ($/t)
    pub port_price: f64,
    /// Landed price at port (Rs/t)
    pub port_price_inr: f64,
    /// Delivered city-market price (Rs/t)
    pub market_price_inr: f64,
}

/// Run the chain for one FOB price
pub fn calculate(fob: f64, inputs: &LandedCostInputs) -> Result<LandedCostBreakdown> {
    if !fob.is_finite() {
        return Err(LandedCostError::InvalidInput(format!(
            "FOB price must be finite, got {}",
            fob
        )));
    }
    inputs.validate()?;

    let cfr = fob + inputs.sea_freight;
    let insurance = cfr * INSURANCE_RATE;
    let cif = cfr + insurance;
    let basic_customs_duty = cif * inputs.basic_customs_duty_pct / 100.0;
    let social_welfare_surcharge = basic_customs_duty * SOCIAL_WELFARE_RATE;
    let landed_value = cif + basic_customs_duty + social_welfare_surcharge;
    let safeguard_duty = landed_value * inputs.safeguard_duty_pct / 100.0;
    let port_price = landed_value
        + inputs.lc_port_charges
        + inputs.applicable_sgd
        + inputs.antidumping
        + inputs.mip;
    let port_price_inr = port_price * inputs.exchange_rate;

    Ok(LandedCostBreakdown {
        fob,
        cfr,
        insurance,
        cif,
        basic_customs_duty,
        social_welfare_surcharge,
        landed_value,
        safeguard_duty,
        port_price,
        port_price_inr,
        market_price_inr: port_price_inr + inputs.port_to_city_freight,
    })
}

impl LandedCostBreakdown {
    /// Labelled amounts in chain order, for tabular display
    pub fn rows(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("HRC FOB ($/t)", self.fob),
            ("HRC CFR at Port ($/t)", self.cfr),
            ("Insurance @1% on CFR ($/t)", self.insurance),
            ("CIF / Assessable Value ($/t)", self.cif),
            ("Basic Customs Duty ($/t)", self.basic_customs_duty),
            ("Social Welfare Surcharge @10% on BCD ($/t)", self.social_welfare_surcharge),
            ("Landed Value ($/t)", self.landed_value),
            ("Safeguard Duty ($/t)", self.safeguard_duty),
            ("Landed Price at Port ($/t)", self.port_price),
            ("Landed Price at Port (Rs/t)", self.port_price_inr),
            ("HRC Basic Landed at Market (Rs/t)", self.market_price_inr),
        ]
    }
}
