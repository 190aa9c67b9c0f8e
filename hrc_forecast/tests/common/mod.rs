#![allow(dead_code)]

use chrono::NaiveDate;
use hrc_forecast::{DriverSet, HistoricalPanel, PanelRow, PricePair, PriceHistory};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// True slope of the China price on ln(iron ore) in the synthetic panel
pub const IRON_ORE_SLOPE: f64 = 300.0;

pub fn ym(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

/// Monthly panel starting Jan-2015 where
/// `price = 300 ln(iron ore) - 900 + noise`.
///
/// Two growth drivers dip below zero early on, so their log shifts are
/// non-zero while recent values sit well inside the historical range.
pub fn synthetic_panel(months: usize, seed: u64) -> HistoricalPanel {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();
    let mut draw = |sd: f64| sd * noise.sample(&mut rng);

    let mut month = ym(2015, 1);
    let mut rows = Vec::with_capacity(months);

    for t in 0..months {
        let tf = t as f64;
        let shock = if t < 6 { -10.0 } else { 0.0 };

        let drivers = DriverSet {
            iron_ore: 110.0 + 15.0 * (tf / 5.0).sin() + draw(3.0),
            coking_coal: 230.0 + 20.0 * (tf / 7.0).cos() + draw(5.0),
            scrap: 380.0 + 15.0 * (tf / 9.0 + 1.0).sin() + draw(5.0),
            export_share: 8.0 + 1.0 * (tf / 4.0).sin() + draw(0.3),
            fai_growth: 4.0 + 1.5 * (tf / 6.0).sin() + shock + draw(0.5),
            auto_production: 6.0 + 2.0 * (tf / 3.0).cos() + shock + draw(0.8),
            vessel_production: 12.0 + 2.0 * (tf / 8.0).sin() + draw(0.8),
            fridge_production: 5.0 + 1.5 * (tf / 5.0 + 2.0).sin() + draw(0.5),
            air_conditioner_production: 9.0 + 2.0 * (tf / 4.0 + 1.0).cos() + draw(0.7),
        };
        let hrc_price = IRON_ORE_SLOPE * drivers.iron_ore.ln() - 900.0 + draw(1.0);

        rows.push(PanelRow {
            month,
            hrc_price,
            drivers,
        });
        month = month.checked_add_months(chrono::Months::new(1)).unwrap();
    }

    HistoricalPanel::new(rows).unwrap()
}

/// China prices from the panel paired with `japan = 0.8 china + 90 + noise`
pub fn synthetic_prices(panel: &HistoricalPanel, seed: u64) -> PriceHistory {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 2.0).unwrap();

    let rows = panel
        .rows()
        .iter()
        .map(|r| PricePair {
            month: r.month,
            china: Some(r.hrc_price),
            japan: Some(0.8 * r.hrc_price + 90.0 + noise.sample(&mut rng)),
        })
        .collect();

    PriceHistory::new(rows).unwrap()
}
