use chrono::{Months, NaiveDate};
use hrc_forecast::config::{PipelineConfig, VarConfig};
use hrc_forecast::{
    DriverSet, ForecastPipeline, ForecastRequest, HistoricalPanel, PanelRow, PricePair,
    PriceHistory, Scenario,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("HRC Forecast: Scenario Example");
    println!("==============================\n");

    let (panel, prices) = create_sample_data(96)?;
    println!(
        "Sample data created: {} panel months, {} price months\n",
        panel.len(),
        prices.len()
    );

    let config = PipelineConfig {
        var: VarConfig {
            max_lags: 6,
            lag_order: 2,
            ..VarConfig::default()
        },
        ..PipelineConfig::default()
    };
    let pipeline = ForecastPipeline::new(config)?;
    let request = ForecastRequest {
        horizon_months: Some(12),
        ..ForecastRequest::default()
    };
    let output = pipeline.generate_forecast(&panel, &prices, &request)?;

    if let Some(selection) = &output.lag_selection {
        println!("Lag scores:");
        for score in &selection.scores {
            println!(
                "  p={:2}  AIC {:8.3}  BIC {:8.3}  HQIC {:8.3}",
                score.lag, score.aic, score.bic, score.hqic
            );
        }
        println!("Preferred lag: {}\n", selection.selected);
    }

    println!("China regression: {}", output.china_fit);
    if let Some(fit) = &output.japan_fit {
        println!("Japan regression: {}\n", fit);
    }

    println!("China paths:");
    for scenario in Scenario::ALL {
        let path = output.china.get(scenario);
        let last = path.values().last().copied().unwrap_or_default();
        println!("  {:8} {} months, ends at {:.2}", scenario.to_string(), path.len(), last);
    }

    println!("\nForecast table:");
    output.table.write_to(std::io::stdout().lock())?;

    Ok(())
}

// Sample panel where the price follows iron ore and scrap
fn create_sample_data(months: usize) -> Result<(HistoricalPanel, PriceHistory), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 1.0)?;
    let mut month = NaiveDate::from_ymd_opt(2016, 1, 1).ok_or("invalid start month")?;

    let mut rows = Vec::with_capacity(months);
    let mut pairs = Vec::with_capacity(months);

    for t in 0..months {
        let tf = t as f64;
        let mut draw = |sd: f64| sd * noise.sample(&mut rng);

        let drivers = DriverSet {
            iron_ore: 105.0 + 12.0 * (tf / 6.0).sin() + draw(3.0),
            coking_coal: 225.0 + 20.0 * (tf / 8.0).cos() + draw(4.0),
            scrap: 375.0 + 15.0 * (tf / 10.0).sin() + draw(4.0),
            export_share: 9.0 + (tf / 5.0).sin() + draw(0.3),
            fai_growth: 2.0 + 4.0 * (tf / 12.0).sin() + draw(0.8),
            auto_production: 4.0 + 3.0 * (tf / 4.0).cos() + draw(1.0),
            vessel_production: 10.0 + 2.0 * (tf / 7.0).sin() + draw(0.8),
            fridge_production: 6.0 + 1.5 * (tf / 5.0).cos() + draw(0.5),
            air_conditioner_production: 8.0 + 2.0 * (tf / 6.0).sin() + draw(0.6),
        };
        let hrc_price =
            250.0 * drivers.iron_ore.ln() + 120.0 * drivers.scrap.ln() - 1_400.0 + draw(4.0);
        let japan = 0.85 * hrc_price + 70.0 + draw(5.0);

        rows.push(PanelRow {
            month,
            hrc_price,
            drivers,
        });
        pairs.push(PricePair {
            month,
            china: Some(hrc_price),
            japan: Some(japan),
        });
        month = month
            .checked_add_months(Months::new(1))
            .ok_or("month overflow")?;
    }

    Ok((HistoricalPanel::new(rows)?, PriceHistory::new(pairs)?))
}
