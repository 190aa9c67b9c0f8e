//! Forecast table and chart series handed to display and export layers

use crate::config::OutputConfig;
use crate::data::{HistoricalPanel, PriceHistory};
use crate::error::Result;
use crate::models::ForecastPath;
use crate::scenario::{Country, ScenarioSet};
use crate::utils::format_month;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Header of the month label column
pub const MONTH_LABEL_COLUMN: &str = "Month";
/// Header of the China forecast column
pub const CHINA_FORECAST_COLUMN: &str = "China HRC Forecast (FOB, $/t)";
/// Header of the Japan forecast column
pub const JAPAN_FORECAST_COLUMN: &str = "Japan HRC Forecast (FOB, $/t)";

/// One month of the forecast table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub month: NaiveDate,
    /// Human-facing month label
    pub label: String,
    pub china: Option<f64>,
    pub japan: Option<f64>,
}

impl ForecastRow {
    /// Price for a country, `None` when that series has no value this month
    pub fn price(&self, country: Country) -> Option<f64> {
        match country {
            Country::China => self.china,
            Country::Japan => self.japan,
        }
    }
}

/// Base-scenario China and Japan forecasts keyed by month
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    /// Outer-join the China and Japan paths on month.
    ///
    /// Months present in only one path keep `None` for the other. Rows are
    /// then restricted to months strictly after `table_after`, and after the
    /// China anchor month when `exclude_anchor` is set.
    pub fn assemble(
        china: &ForecastPath,
        japan: Option<&ForecastPath>,
        options: &OutputConfig,
    ) -> Result<Self> {
        let mut joined: BTreeMap<NaiveDate, (Option<f64>, Option<f64>)> = BTreeMap::new();
        for (month, value) in china.points() {
            joined.entry(month).or_default().0 = Some(value);
        }
        if let Some(japan) = japan {
            for (month, value) in japan.points() {
                joined.entry(month).or_default().1 = Some(value);
            }
        }

        let anchor = if options.exclude_anchor {
            china.first().map(|(month, _)| month)
        } else {
            None
        };
        let threshold = match (options.table_after, anchor) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };

        let rows = joined
            .into_iter()
            .filter(|(month, _)| threshold.map_or(true, |t| *month > t))
            .map(|(month, (china, japan))| {
                Ok(ForecastRow {
                    month,
                    label: format_month(month, &options.month_format)?,
                    china,
                    japan,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Month labels in table order
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }

    /// Row for a month label such as `Apr-25`
    pub fn row(&self, label: &str) -> Option<&ForecastRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Single FOB price for the landed-cost calculator
    pub fn fob_price(&self, label: &str, country: Country) -> Option<f64> {
        self.row(label).and_then(|r| r.price(country))
    }

    /// Convert to a polars DataFrame with the export column names
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let labels: Vec<&str> = self.labels();
        let china: Vec<Option<f64>> = self.rows.iter().map(|r| r.china).collect();
        let japan: Vec<Option<f64>> = self.rows.iter().map(|r| r.japan).collect();

        let df = DataFrame::new(vec![
            Series::new(MONTH_LABEL_COLUMN, labels),
            Series::new(CHINA_FORECAST_COLUMN, china),
            Series::new(JAPAN_FORECAST_COLUMN, japan),
        ])?;
        Ok(df)
    }

    /// Write CSV to any writer; missing prices become empty cells
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            MONTH_LABEL_COLUMN,
            CHINA_FORECAST_COLUMN,
            JAPAN_FORECAST_COLUMN,
        ])?;

        let cell = |v: Option<f64>| v.map(|x| format!("{:.2}", x)).unwrap_or_default();
        for row in &self.rows {
            csv_writer.write_record([row.label.clone(), cell(row.china), cell(row.japan)])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Write CSV to a file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(file)
    }

    /// Serialize rows as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }
}

/// Role of a chart series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    History,
    Forecast,
    /// Upper band edge
    Upside,
    /// Lower band edge
    Downside,
}

/// Named `(month, price)` series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub country: Country,
    pub kind: SeriesKind,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Plot-ready history and scenario series for the selected countries
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    series: Vec<ChartSeries>,
}

impl ChartData {
    /// Collect history and scenario paths for every selected country.
    ///
    /// Countries without computed paths are left out.
    pub fn build(
        panel: &HistoricalPanel,
        prices: &PriceHistory,
        china: &ScenarioSet<ForecastPath>,
        japan: Option<&ScenarioSet<ForecastPath>>,
        countries: &[Country],
        japan_history_start: Option<NaiveDate>,
    ) -> Self {
        let mut chart = ChartData::default();

        for country in Country::ALL {
            if !countries.contains(&country) {
                continue;
            }

            let (history, paths) = match country {
                Country::China => (
                    panel
                        .rows()
                        .iter()
                        .map(|r| (r.month, r.hrc_price))
                        .collect::<Vec<_>>(),
                    Some(china),
                ),
                Country::Japan => (prices.japan_training_history(japan_history_start), japan),
            };
            let Some(paths) = paths else {
                continue;
            };

            chart.push(country, SeriesKind::History, "Historical", history);
            chart.push(country, SeriesKind::Forecast, "Forecast", paths.base.points());
            chart.push(country, SeriesKind::Upside, "Upside", paths.upside.points());
            chart.push(country, SeriesKind::Downside, "Downside", paths.downside.points());
        }

        chart
    }

    fn push(&mut self, country: Country, kind: SeriesKind, label: &str, points: Vec<(NaiveDate, f64)>) {
        self.series.push(ChartSeries {
            name: format!("{} {}", country, label),
            country,
            kind,
            points,
        });
    }

    pub fn series(&self) -> &[ChartSeries] {
        &self.series
    }

    /// Series for one country and role
    pub fn get(&self, country: Country, kind: SeriesKind) -> Option<&ChartSeries> {
        self.series
            .iter()
            .find(|s| s.country == country && s.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
