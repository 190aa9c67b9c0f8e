//! Historical panel handling for forecasting

use crate::error::{ForecastError, Result};
use crate::utils::{is_contiguous, is_month_start, parse_month};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Name of the month key column in both input tables
pub const DATE_COLUMN: &str = "Date";
/// China HRC price column of the driver panel
pub const HRC_COLUMN: &str = "HRC (FOB, $/t)";
/// China price column of the paired China/Japan table
pub const CHINA_PRICE_COLUMN: &str = "China HRC (FOB, $/t)";
/// Japan price column of the paired China/Japan table
pub const JAPAN_PRICE_COLUMN: &str = "Japan HRC (FOB, $/t)";

/// Days between 0001-01-01 and 1970-01-01, for polars `Date` columns
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Macroeconomic drivers of the China HRC price
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    IronOre,
    CokingCoal,
    Scrap,
    ExportShare,
    FaiGrowth,
    AutoProduction,
    VesselProduction,
    FridgeProduction,
    AirConditionerProduction,
}

impl Driver {
    /// Every driver, in panel column order
    pub const ALL: [Driver; 9] = [
        Driver::IronOre,
        Driver::CokingCoal,
        Driver::Scrap,
        Driver::ExportShare,
        Driver::FaiGrowth,
        Driver::AutoProduction,
        Driver::VesselProduction,
        Driver::FridgeProduction,
        Driver::AirConditionerProduction,
    ];

    /// Drivers that upside/downside scenarios replace with caller-supplied values
    pub const SCENARIO: [Driver; 5] = [
        Driver::IronOre,
        Driver::CokingCoal,
        Driver::Scrap,
        Driver::ExportShare,
        Driver::FaiGrowth,
    ];

    /// Column name in the historical panel
    pub fn column_name(self) -> &'static str {
        match self {
            Driver::IronOre => "Iron Ore (CFR, $/t)",
            Driver::CokingCoal => "HCC (Aus FOB, $/t)",
            Driver::Scrap => "Domestic Scrap (DDP Jiangsu incl. VAT $/t)",
            Driver::ExportShare => "Monthly Export of Semis & Finished Steel as % of Production",
            Driver::FaiGrowth => "FAI in urban real estate development (y-o-y) Growth",
            Driver::AutoProduction => "Automobile Production (y-o-y)",
            Driver::VesselProduction => "Civil Metal-Vessels/Steel Ships (y-o-y)",
            Driver::FridgeProduction => "Household Fridges (y-o-y)",
            Driver::AirConditionerProduction => "Air Conditioner (y-o-y)",
        }
    }

    /// Position of the driver in [`Driver::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One value per driver
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriverSet {
    pub iron_ore: f64,
    pub coking_coal: f64,
    pub scrap: f64,
    pub export_share: f64,
    pub fai_growth: f64,
    pub auto_production: f64,
    pub vessel_production: f64,
    pub fridge_production: f64,
    pub air_conditioner_production: f64,
}

impl DriverSet {
    /// Value of a single driver
    pub fn get(&self, driver: Driver) -> f64 {
        match driver {
            Driver::IronOre => self.iron_ore,
            Driver::CokingCoal => self.coking_coal,
            Driver::Scrap => self.scrap,
            Driver::ExportShare => self.export_share,
            Driver::FaiGrowth => self.fai_growth,
            Driver::AutoProduction => self.auto_production,
            Driver::VesselProduction => self.vessel_production,
            Driver::FridgeProduction => self.fridge_production,
            Driver::AirConditionerProduction => self.air_conditioner_production,
        }
    }

    /// Replace a single driver value
    pub fn set(&mut self, driver: Driver, value: f64) {
        let slot = match driver {
            Driver::IronOre => &mut self.iron_ore,
            Driver::CokingCoal => &mut self.coking_coal,
            Driver::Scrap => &mut self.scrap,
            Driver::ExportShare => &mut self.export_share,
            Driver::FaiGrowth => &mut self.fai_growth,
            Driver::AutoProduction => &mut self.auto_production,
            Driver::VesselProduction => &mut self.vessel_production,
            Driver::FridgeProduction => &mut self.fridge_production,
            Driver::AirConditionerProduction => &mut self.air_conditioner_production,
        };
        *slot = value;
    }

    /// Values in [`Driver::ALL`] order
    pub fn to_array(&self) -> [f64; 9] {
        Driver::ALL.map(|d| self.get(d))
    }

    /// Build from values in [`Driver::ALL`] order
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        if values.len() != Driver::ALL.len() {
            return Err(ForecastError::DataError(format!(
                "Expected {} driver values, got {}",
                Driver::ALL.len(),
                values.len()
            )));
        }

        let mut set = DriverSet::default();
        for (driver, value) in Driver::ALL.iter().zip(values) {
            set.set(*driver, *value);
        }
        Ok(set)
    }
}

/// One month of the historical panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    /// First day of the month
    pub month: NaiveDate,
    /// China HRC price (FOB, $/t)
    pub hrc_price: f64,
    /// Driver values for the month
    pub drivers: DriverSet,
}

impl PanelRow {
    /// Values in VAR column order: HRC price followed by the drivers
    pub fn to_vec(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(PANEL_WIDTH);
        values.push(self.hrc_price);
        values.extend_from_slice(&self.drivers.to_array());
        values
    }
}

/// Number of modelled variables in a panel row
pub const PANEL_WIDTH: usize = 1 + Driver::ALL.len();

/// Column names matching [`PanelRow::to_vec`]
pub fn panel_variable_names() -> Vec<&'static str> {
    std::iter::once(HRC_COLUMN)
        .chain(Driver::ALL.iter().map(|d| d.column_name()))
        .collect()
}

/// Monthly panel of the China HRC price and its drivers
///
/// Months are first-of-month, strictly increasing, contiguous and unique, and
/// every value is finite.
#[derive(Debug, Clone)]
pub struct HistoricalPanel {
    rows: Vec<PanelRow>,
}

impl HistoricalPanel {
    /// Create a validated panel
    pub fn new(rows: Vec<PanelRow>) -> Result<Self> {
        if rows.is_empty() {
            return Err(ForecastError::InsufficientData(
                "Historical panel is empty".to_string(),
            ));
        }

        if let Some(row) = rows.iter().find(|r| !is_month_start(r.month)) {
            return Err(ForecastError::DataError(format!(
                "Panel month {} is not the first day of a month",
                row.month
            )));
        }

        let months: Vec<NaiveDate> = rows.iter().map(|r| r.month).collect();
        if !is_contiguous(&months) {
            return Err(ForecastError::DataError(
                "Panel months must be strictly increasing with no gaps".to_string(),
            ));
        }

        for row in &rows {
            if row.to_vec().iter().any(|v| !v.is_finite()) {
                return Err(ForecastError::DataError(format!(
                    "Panel row {} contains a missing or non-finite value",
                    row.month
                )));
            }
        }

        Ok(Self { rows })
    }

    /// Panel rows in month order
    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    /// Number of months
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the panel is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Month keys
    pub fn months(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.month).collect()
    }

    /// Most recent row
    pub fn last(&self) -> &PanelRow {
        // `new` rejects empty panels
        &self.rows[self.rows.len() - 1]
    }

    /// China HRC prices
    pub fn hrc_prices(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.hrc_price).collect()
    }

    /// Driver values
    pub fn drivers(&self) -> Vec<DriverSet> {
        self.rows.iter().map(|r| r.drivers).collect()
    }

    /// Rows as plain vectors in VAR column order
    pub fn to_matrix_rows(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(PanelRow::to_vec).collect()
    }
}

/// One month of paired China/Japan prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePair {
    pub month: NaiveDate,
    pub china: Option<f64>,
    pub japan: Option<f64>,
}

/// Historical China and Japan HRC prices keyed by month
///
/// Months are unique and strictly increasing; gaps and missing values are
/// allowed.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    rows: Vec<PricePair>,
}

impl PriceHistory {
    /// Create a validated price history
    pub fn new(rows: Vec<PricePair>) -> Result<Self> {
        if let Some(row) = rows.iter().find(|r| !is_month_start(r.month)) {
            return Err(ForecastError::DataError(format!(
                "Price month {} is not the first day of a month",
                row.month
            )));
        }

        if rows.windows(2).any(|w| w[0].month >= w[1].month) {
            return Err(ForecastError::DataError(
                "Price months must be unique and strictly increasing".to_string(),
            ));
        }

        let non_finite = |v: Option<f64>| matches!(v, Some(x) if !x.is_finite());
        if let Some(row) = rows.iter().find(|r| non_finite(r.china) || non_finite(r.japan)) {
            return Err(ForecastError::DataError(format!(
                "Price row {} contains a non-finite value",
                row.month
            )));
        }

        Ok(Self { rows })
    }

    /// Rows in month order
    pub fn rows(&self) -> &[PricePair] {
        &self.rows
    }

    /// Number of months
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows where both prices are present, as `(month, china, japan)`
    pub fn complete_pairs(&self) -> Vec<(NaiveDate, f64, f64)> {
        self.rows
            .iter()
            .filter_map(|r| match (r.china, r.japan) {
                (Some(c), Some(j)) => Some((r.month, c, j)),
                _ => None,
            })
            .collect()
    }

    /// Japan prices of the regression training window after `start`.
    ///
    /// Only complete pairs count, and the most recent one is left out as it is
    /// held out of training.
    pub fn japan_training_history(&self, start: Option<NaiveDate>) -> Vec<(NaiveDate, f64)> {
        let mut pairs = self.complete_pairs();
        pairs.pop();
        pairs
            .into_iter()
            .filter(|(month, _, _)| start.map_or(true, |s| *month > s))
            .map(|(month, _, japan)| (month, japan))
            .collect()
    }
}

/// Data loader for the historical input tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load the driver panel from a CSV file
    pub fn panel_from_csv<P: AsRef<Path>>(path: P) -> Result<HistoricalPanel> {
        let df = Self::read_csv(path)?;
        Self::panel_from_dataframe(&df)
    }

    /// Load the paired China/Japan prices from a CSV file
    pub fn prices_from_csv<P: AsRef<Path>>(path: P) -> Result<PriceHistory> {
        let df = Self::read_csv(path)?;
        Self::prices_from_dataframe(&df)
    }

    /// Build the driver panel from an existing DataFrame
    pub fn panel_from_dataframe(df: &DataFrame) -> Result<HistoricalPanel> {
        let months = Self::month_column(df)?;
        let hrc = Self::required_values(df, HRC_COLUMN)?;

        let mut driver_columns = Vec::with_capacity(Driver::ALL.len());
        for driver in Driver::ALL {
            driver_columns.push(Self::required_values(df, driver.column_name())?);
        }

        let rows = months
            .iter()
            .enumerate()
            .map(|(i, month)| {
                let values: Vec<f64> = driver_columns.iter().map(|col| col[i]).collect();
                Ok(PanelRow {
                    month: *month,
                    hrc_price: hrc[i],
                    drivers: DriverSet::from_slice(&values)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        HistoricalPanel::new(rows)
    }

    /// Build the paired price history from an existing DataFrame
    pub fn prices_from_dataframe(df: &DataFrame) -> Result<PriceHistory> {
        let months = Self::month_column(df)?;
        let china = Self::optional_values(df, CHINA_PRICE_COLUMN)?;
        let japan = Self::optional_values(df, JAPAN_PRICE_COLUMN)?;

        let rows = months
            .into_iter()
            .zip(china.into_iter().zip(japan))
            .map(|(month, (china, japan))| PricePair {
                month,
                china,
                japan,
            })
            .collect();

        PriceHistory::new(rows)
    }

    fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;
        Ok(df)
    }

    fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
        df.column(name)
            .map_err(|_| ForecastError::MissingColumn(name.to_string()))
    }

    /// Parse the month key column, accepting text or temporal dtypes
    fn month_column(df: &DataFrame) -> Result<Vec<NaiveDate>> {
        let col = Self::column(df, DATE_COLUMN)?;

        match col.dtype() {
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .enumerate()
                .map(|(i, value)| match value {
                    Some(s) => parse_month(s),
                    None => Err(ForecastError::DataError(format!("Row {} has no date", i))),
                })
                .collect(),
            dtype if dtype.is_temporal() => {
                let days = col.cast(&DataType::Date)?.cast(&DataType::Int32)?;
                days.i32()?
                    .into_iter()
                    .enumerate()
                    .map(|(i, value)| {
                        let date = value
                            .and_then(|d| {
                                NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE)
                            })
                            .ok_or_else(|| {
                                ForecastError::DataError(format!("Row {} has no date", i))
                            })?;
                        if is_month_start(date) {
                            Ok(date)
                        } else {
                            Err(ForecastError::DataError(format!(
                                "Date {} is not the first day of a month",
                                date
                            )))
                        }
                    })
                    .collect()
            }
            other => Err(ForecastError::DataError(format!(
                "Column '{}' has unsupported type {}",
                DATE_COLUMN, other
            ))),
        }
    }

    fn optional_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
        let col = Self::column(df, name)?;
        let cast = col.cast(&DataType::Float64).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' is not numeric: {}", name, e))
        })?;
        let values = cast.f64()?.into_iter().collect();
        Ok(values)
    }

    fn required_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        Self::optional_values(df, name)?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                value.ok_or_else(|| {
                    ForecastError::DataError(format!("Column '{}' is missing row {}", name, i))
                })
            })
            .collect()
    }
}
