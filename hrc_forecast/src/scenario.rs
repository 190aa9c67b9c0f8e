//! Scenario definitions and the single scenario-apply path

use crate::data::{Driver, DriverSet};
use crate::error::{ForecastError, Result};
use crate::models::{FittedChinaModel, ForecastPath, TrainedRegression};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Macro case a price path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// VAR-forecast drivers, no overrides
    Base,
    Upside,
    Downside,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Base, Scenario::Upside, Scenario::Downside];
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Base => write!(f, "base"),
            Scenario::Upside => write!(f, "upside"),
            Scenario::Downside => write!(f, "downside"),
        }
    }
}

/// Market whose HRC price is forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    China,
    Japan,
}

impl Country {
    pub const ALL: [Country; 2] = [Country::China, Country::Japan];
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Country::China => write!(f, "China"),
            Country::Japan => write!(f, "Japan"),
        }
    }
}

impl FromStr for Country {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "china" => Ok(Country::China),
            "japan" => Ok(Country::Japan),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown country '{}', expected china or japan",
                other
            ))),
        }
    }
}

/// Caller-supplied levels for the five scenario drivers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDrivers {
    /// Iron ore (CFR, $/t)
    pub iron_ore: f64,
    /// Hard coking coal (Aus FOB, $/t)
    pub coking_coal: f64,
    /// Domestic scrap ($/t)
    pub scrap: f64,
    /// Exports as % of production
    pub export_share: f64,
    /// Urban real-estate FAI growth (y-o-y)
    pub fai_growth: f64,
}

impl ScenarioDrivers {
    /// Optimistic preset used by the dashboard
    pub fn upside() -> Self {
        Self {
            iron_ore: 100.0,
            coking_coal: 220.0,
            scrap: 400.0,
            export_share: 9.0,
            fai_growth: 5.0,
        }
    }

    /// Pessimistic preset used by the dashboard
    pub fn downside() -> Self {
        Self {
            iron_ore: 85.0,
            coking_coal: 180.0,
            scrap: 350.0,
            export_share: 12.0,
            fai_growth: 1.0,
        }
    }

    /// Values in [`Driver::SCENARIO`] order
    pub fn to_array(&self) -> [f64; 5] {
        [
            self.iron_ore,
            self.coking_coal,
            self.scrap,
            self.export_share,
            self.fai_growth,
        ]
    }

    /// Build from values in [`Driver::SCENARIO`] order
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [iron_ore, coking_coal, scrap, export_share, fai_growth] => Ok(Self {
                iron_ore: *iron_ore,
                coking_coal: *coking_coal,
                scrap: *scrap,
                export_share: *export_share,
                fai_growth: *fai_growth,
            }),
            _ => Err(ForecastError::InvalidParameter(format!(
                "Scenario needs {} driver values, got {}",
                Driver::SCENARIO.len(),
                values.len()
            ))),
        }
    }

    /// Override map holding every scenario driver
    pub fn overrides(&self) -> Result<DriverOverrides> {
        let mut overrides = DriverOverrides::new();
        for (driver, value) in Driver::SCENARIO.iter().zip(self.to_array()) {
            overrides.insert(*driver, value)?;
        }
        Ok(overrides)
    }
}

/// Driver levels held constant over every forecast month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverOverrides(BTreeMap<Driver, f64>);

impl DriverOverrides {
    /// Empty map, which leaves drivers untouched
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `driver` to `value`
    pub fn insert(&mut self, driver: Driver, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "Override for '{}' must be finite, got {}",
                driver.column_name(),
                value
            )));
        }
        self.0.insert(driver, value);
        Ok(())
    }

    pub fn get(&self, driver: Driver) -> Option<f64> {
        self.0.get(&driver).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Copy of `row` with the overridden drivers replaced
    pub fn apply(&self, row: &DriverSet) -> DriverSet {
        let mut out = *row;
        for (driver, value) in &self.0 {
            out.set(*driver, *value);
        }
        out
    }

    pub fn apply_all(&self, rows: &[DriverSet]) -> Vec<DriverSet> {
        rows.iter().map(|r| self.apply(r)).collect()
    }
}

/// Predict China prices for one scenario
///
/// The base scenario passes an empty override map.
pub fn apply_scenario(
    model: &FittedChinaModel,
    forecast_drivers: &[DriverSet],
    overrides: &DriverOverrides,
) -> Result<Vec<f64>> {
    model.predict(&overrides.apply_all(forecast_drivers))
}

/// One value per scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet<T> {
    pub base: T,
    pub upside: T,
    pub downside: T,
}

impl<T> ScenarioSet<T> {
    /// Build each member from its scenario
    pub fn try_from_fn<F>(mut f: F) -> Result<Self>
    where
        F: FnMut(Scenario) -> Result<T>,
    {
        Ok(Self {
            base: f(Scenario::Base)?,
            upside: f(Scenario::Upside)?,
            downside: f(Scenario::Downside)?,
        })
    }

    pub fn get(&self, scenario: Scenario) -> &T {
        match scenario {
            Scenario::Base => &self.base,
            Scenario::Upside => &self.upside,
            Scenario::Downside => &self.downside,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Scenario, &T)> {
        Scenario::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

impl ScenarioSet<ForecastPath> {
    /// Fail unless every path has the base path's months
    pub fn ensure_aligned(&self) -> Result<()> {
        let reference = self.base.months();
        for (scenario, path) in self.iter() {
            if path.months() != reference {
                return Err(ForecastError::ScenarioMisalignment(format!(
                    "{} path has {} months starting {:?}, base has {} starting {:?}",
                    scenario,
                    path.len(),
                    path.months().first(),
                    reference.len(),
                    reference.first()
                )));
            }
        }
        Ok(())
    }
}
