mod common;

use common::ym;
use hrc_forecast::data::{CHINA_PRICE_COLUMN, DATE_COLUMN, HRC_COLUMN, JAPAN_PRICE_COLUMN};
use hrc_forecast::{DataLoader, Driver, ForecastError};
use polars::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn panel_header() -> Vec<String> {
    let mut header = vec![DATE_COLUMN.to_string(), HRC_COLUMN.to_string()];
    header.extend(Driver::ALL.iter().map(|d| d.column_name().to_string()));
    header
}

fn write_panel_csv(dates: &[&str], skip_column: Option<&str>) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    let mut writer = csv::Writer::from_path(file.path()).unwrap();

    let header: Vec<String> = panel_header()
        .into_iter()
        .filter(|h| Some(h.as_str()) != skip_column)
        .collect();
    writer.write_record(&header).unwrap();

    for (i, date) in dates.iter().enumerate() {
        let mut record = vec![date.to_string(), format!("{}", 500.0 + i as f64)];
        for j in 0..Driver::ALL.len() {
            record.push(format!("{}", (j as f64 - 4.0) * 2.5 + i as f64));
        }
        let record: Vec<String> = panel_header()
            .iter()
            .zip(record)
            .filter(|(h, _)| Some(h.as_str()) != skip_column)
            .map(|(_, v)| v)
            .collect();
        writer.write_record(&record).unwrap();
    }
    writer.flush().unwrap();
    file
}

#[test]
fn test_panel_from_csv() {
    let file = write_panel_csv(&["2024-01-01", "2024-02-01", "2024-03-01"], None);
    let panel = DataLoader::panel_from_csv(file.path()).unwrap();

    assert_eq!(panel.len(), 3);
    assert_eq!(panel.months(), vec![ym(2024, 1), ym(2024, 2), ym(2024, 3)]);
    assert_eq!(panel.last().hrc_price, 502.0);
    assert_eq!(panel.rows()[0].drivers.iron_ore, -10.0);
    assert_eq!(panel.rows()[2].drivers.air_conditioner_production, 12.0);
}

#[test]
fn test_panel_accepts_us_dates() {
    let file = write_panel_csv(&["10/01/2024", "11/01/2024"], None);
    let panel = DataLoader::panel_from_csv(file.path()).unwrap();
    assert_eq!(panel.last().month, ym(2024, 11));
}

#[test]
fn test_panel_missing_column() {
    let file = write_panel_csv(&["2024-01-01", "2024-02-01"], Some("Household Fridges (y-o-y)"));
    let result = DataLoader::panel_from_csv(file.path());
    match result {
        Err(ForecastError::MissingColumn(name)) => assert_eq!(name, "Household Fridges (y-o-y)"),
        other => panic!("expected missing column, got {:?}", other),
    }
}

#[test]
fn test_panel_rejects_gap_and_mid_month() {
    let gap = write_panel_csv(&["2024-01-01", "2024-03-01"], None);
    assert!(matches!(
        DataLoader::panel_from_csv(gap.path()),
        Err(ForecastError::DataError(_))
    ));

    let mid = write_panel_csv(&["2024-01-15", "2024-02-15"], None);
    assert!(DataLoader::panel_from_csv(mid.path()).is_err());
}

#[test]
fn test_prices_allow_missing_values() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{},{},{}", DATE_COLUMN, "\"China HRC (FOB, $/t)\"", "\"Japan HRC (FOB, $/t)\"").unwrap();
    writeln!(file, "2024-01-01,480.5,510.0").unwrap();
    writeln!(file, "2024-02-01,,505.0").unwrap();
    writeln!(file, "2024-04-01,470.0,").unwrap();
    file.flush().unwrap();

    let prices = DataLoader::prices_from_csv(file.path()).unwrap();
    assert_eq!(prices.len(), 3);
    assert_eq!(prices.rows()[1].china, None);
    assert_eq!(prices.rows()[2].japan, None);
    assert_eq!(prices.complete_pairs(), vec![(ym(2024, 1), 480.5, 510.0)]);
}

#[test]
fn test_prices_from_dataframe() {
    let df = df! {
        DATE_COLUMN => &["2024-01-01", "2024-02-01", "2024-03-01", "2024-04-01"],
        CHINA_PRICE_COLUMN => &[Some(480.0), Some(490.0), None, Some(500.0)],
        JAPAN_PRICE_COLUMN => &[None, Some(520.0), Some(525.0), Some(530.0)],
    }
    .unwrap();

    let prices = DataLoader::prices_from_dataframe(&df).unwrap();
    assert_eq!(prices.japan_training_history(None), vec![(ym(2024, 2), 520.0)]);
    assert!(prices.japan_training_history(Some(ym(2024, 2))).is_empty());
}

#[test]
fn test_missing_file_is_io_error() {
    let result = DataLoader::prices_from_csv("does_not_exist.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}
