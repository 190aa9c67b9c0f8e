mod common;

use common::ym;
use hrc_forecast::config::{PipelineConfig, VarConfig};
use hrc_forecast::output::SeriesKind;
use hrc_forecast::{
    Country, ForecastError, ForecastPipeline, ForecastRequest, PriceHistory, Scenario,
    ScenarioDrivers,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Lag 2 keeps the ten-variable VAR well inside the synthetic sample
fn small_config() -> PipelineConfig {
    PipelineConfig {
        var: VarConfig {
            max_lags: 4,
            lag_order: 2,
            ..VarConfig::default()
        },
        ..PipelineConfig::default()
    }
}

/// Scenario values near the recent synthetic levels
fn request(horizon: usize) -> ForecastRequest {
    ForecastRequest {
        upside: ScenarioDrivers {
            iron_ore: 120.0,
            coking_coal: 245.0,
            scrap: 395.0,
            export_share: 8.5,
            fai_growth: 5.0,
        },
        downside: ScenarioDrivers {
            iron_ore: 100.0,
            coking_coal: 215.0,
            scrap: 365.0,
            export_share: 7.5,
            fai_growth: 3.0,
        },
        horizon_months: Some(horizon),
        ..ForecastRequest::default()
    }
}

#[test]
fn test_default_config_full_horizon() {
    let panel = common::synthetic_panel(120, 7);
    let prices = common::synthetic_prices(&panel, 8);
    let pipeline = ForecastPipeline::new(PipelineConfig::default()).unwrap();

    let mut req = request(0);
    req.horizon_months = None;
    let output = pipeline.generate_forecast(&panel, &prices, &req).unwrap();

    // 120 months from Jan-2015 ends Dec-2024
    assert_eq!(output.china.base.len(), 18);
    assert_eq!(output.china.base.months()[0], ym(2024, 12));
    assert_eq!(output.china.base.months()[1], ym(2025, 1));
    assert_eq!(output.drivers.len(), 17);
    assert!(output.lag_selection.is_some());
    assert!(output.china.base.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_anchor_invariant_for_every_scenario() {
    let panel = common::synthetic_panel(120, 7);
    let prices = common::synthetic_prices(&panel, 8);
    let pipeline = ForecastPipeline::new(small_config()).unwrap();
    let output = pipeline
        .generate_forecast(&panel, &prices, &request(6))
        .unwrap();

    let last = panel.last();
    let japan = output.japan.as_ref().unwrap();
    let cutover = prices.rows()[prices.len() - 2];
    for scenario in Scenario::ALL {
        assert_eq!(
            output.china.get(scenario).first(),
            Some((last.month, last.hrc_price))
        );
        assert_eq!(
            japan.get(scenario).first(),
            Some((cutover.month, cutover.japan.unwrap()))
        );
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
#[case(17)]
fn test_scenarios_share_timestamps(#[case] horizon: usize) {
    let panel = common::synthetic_panel(120, 7);
    let prices = common::synthetic_prices(&panel, 8);
    let pipeline = ForecastPipeline::new(small_config()).unwrap();
    let output = pipeline
        .generate_forecast(&panel, &prices, &request(horizon))
        .unwrap();

    assert_eq!(output.china.base.len(), horizon + 1);
    assert_eq!(output.china.upside.months(), output.china.base.months());
    assert_eq!(output.china.downside.months(), output.china.base.months());

    let japan = output.japan.unwrap();
    assert_eq!(japan.upside.months(), japan.base.months());
    assert_eq!(japan.downside.months(), japan.base.months());
}

#[test]
fn test_horizon_boundaries() {
    let panel = common::synthetic_panel(120, 7);
    let prices = common::synthetic_prices(&panel, 8);
    let pipeline = ForecastPipeline::new(small_config()).unwrap();

    let one = pipeline
        .generate_forecast(&panel, &prices, &request(1))
        .unwrap();
    assert_eq!(one.china.base.len(), 2);

    let zero = pipeline
        .generate_forecast(&panel, &prices, &request(0))
        .unwrap();
    assert_eq!(zero.china.base.len(), 1);
    assert_eq!(zero.china.upside.len(), 1);
    assert!(zero.drivers.is_empty());
}

#[test]
fn test_repeated_runs_are_identical() {
    let panel = common::synthetic_panel(120, 7);
    let prices = common::synthetic_prices(&panel, 8);
    let pipeline = ForecastPipeline::new(small_config()).unwrap();

    let first = pipeline
        .generate_forecast(&panel, &prices, &request(8))
        .unwrap();
    let second = pipeline
        .generate_forecast(&panel, &prices, &request(8))
        .unwrap();

    assert_eq!(first.china, second.china);
    assert_eq!(first.japan, second.japan);
    assert_eq!(first.table, second.table);
}

#[test]
fn test_override_at_forecast_level_matches_base() {
    let panel = common::synthetic_panel(120, 7);
    let prices = common::synthetic_prices(&panel, 8);
    let pipeline = ForecastPipeline::new(small_config()).unwrap();

    let base_run = pipeline
        .generate_forecast(&panel, &prices, &request(4))
        .unwrap();
    let (month, drivers) = base_run.drivers[0];

    let mut req = request(4);
    req.upside = ScenarioDrivers {
        iron_ore: drivers.iron_ore,
        coking_coal: drivers.coking_coal,
        scrap: drivers.scrap,
        export_share: drivers.export_share,
        fai_growth: drivers.fai_growth,
    };
    let output = pipeline.generate_forecast(&panel, &prices, &req).unwrap();

    assert_eq!(
        output.china.upside.value_at(month),
        output.china.base.value_at(month)
    );
}

#[test]
fn test_upside_and_downside_bracket_iron_ore_effect() {
    let panel = common::synthetic_panel(120, 7);
    let prices = common::synthetic_prices(&panel, 8);
    let pipeline = ForecastPipeline::new(small_config()).unwrap();
    let output = pipeline
        .generate_forecast(&panel, &prices, &request(3))
        .unwrap();

    // Price rises with ln(iron ore) in the synthetic panel
    let up = output.china.upside.values()[1];
    let down = output.china.downside.values()[1];
    assert!(up > down);
}

#[test]
fn test_table_joins_china_and_japan() {
    let panel = common::synthetic_panel(120, 7);
    let prices = common::synthetic_prices(&panel, 8);
    let pipeline = ForecastPipeline::new(small_config()).unwrap();
    let output = pipeline
        .generate_forecast(&panel, &prices, &request(3))
        .unwrap();

    // Japan cutover Nov-24 precedes the China anchor Dec-24
    assert_eq!(
        output.table.labels(),
        vec!["Nov-24", "Dec-24", "Jan-25", "Feb-25", "Mar-25"]
    );
    let first = &output.table.rows()[0];
    assert_eq!(first.china, None);
    assert!(first.japan.is_some());
    assert!(output.table.fob_price("Feb-25", Country::China).is_some());
    assert!(output.table.fob_price("Feb-25", Country::Japan).is_some());
}

#[test]
fn test_price_history_ending_early_is_rejected() {
    let panel = common::synthetic_panel(120, 7);
    let full = common::synthetic_prices(&panel, 8);
    let prices = PriceHistory::new(full.rows()[..114].to_vec()).unwrap();
    let pipeline = ForecastPipeline::new(small_config()).unwrap();

    let result = pipeline.generate_forecast(&panel, &prices, &request(3));
    assert!(matches!(result, Err(ForecastError::DataError(_))));

    // China alone is unaffected
    let mut req = request(3);
    req.countries = vec![Country::China];
    req.skip_unselected = true;
    assert!(pipeline.generate_forecast(&panel, &prices, &req).is_ok());
}

#[test]
fn test_japan_paths_are_contiguous() {
    let panel = common::synthetic_panel(120, 7);
    let prices = common::synthetic_prices(&panel, 8);
    let pipeline = ForecastPipeline::new(small_config()).unwrap();
    let output = pipeline
        .generate_forecast(&panel, &prices, &request(4))
        .unwrap();

    let japan = output.japan.unwrap();
    assert_eq!(
        japan.base.months(),
        &[ym(2024, 11), ym(2024, 12), ym(2025, 1), ym(2025, 2), ym(2025, 3), ym(2025, 4)]
    );
}

#[test]
fn test_japan_chart_history_is_training_window() {
    let panel = common::synthetic_panel(120, 7);
    let full = common::synthetic_prices(&panel, 8);
    let mut rows = full.rows().to_vec();
    rows[50].china = None;
    let prices = PriceHistory::new(rows).unwrap();
    let pipeline = ForecastPipeline::new(small_config()).unwrap();
    let output = pipeline
        .generate_forecast(&panel, &prices, &request(3))
        .unwrap();

    let history = &output
        .chart
        .get(Country::Japan, SeriesKind::History)
        .unwrap()
        .points;
    // Held-out Dec-24 and the month without a China price are left out
    assert_eq!(history.len(), 118);
    assert_eq!(history.last().unwrap().0, ym(2024, 11));
    assert!(history.iter().all(|(month, _)| *month != prices.rows()[50].month));
}

#[test]
fn test_skip_unselected_japan() {
    let panel = common::synthetic_panel(120, 7);
    let prices = common::synthetic_prices(&panel, 8);
    let pipeline = ForecastPipeline::new(small_config()).unwrap();

    let mut req = request(3);
    req.countries = vec![Country::China];
    let computed = pipeline.generate_forecast(&panel, &prices, &req).unwrap();
    assert!(computed.japan.is_some());
    assert!(computed.chart.get(Country::Japan, SeriesKind::Forecast).is_none());
    assert!(computed.chart.get(Country::China, SeriesKind::Upside).is_some());

    req.skip_unselected = true;
    let skipped = pipeline.generate_forecast(&panel, &prices, &req).unwrap();
    assert!(skipped.japan.is_none());
    assert!(skipped.japan_fit.is_none());
    assert!(skipped.table.rows().iter().all(|r| r.japan.is_none()));
}

#[test]
fn test_forecast_start_must_follow_panel() {
    let panel = common::synthetic_panel(120, 7);
    let prices = common::synthetic_prices(&panel, 8);

    let mut config = small_config();
    config.forecast_start = Some(ym(2025, 1));
    let pipeline = ForecastPipeline::new(config.clone()).unwrap();
    assert!(pipeline
        .generate_forecast(&panel, &prices, &request(2))
        .is_ok());

    config.forecast_start = Some(ym(2024, 11));
    let pipeline = ForecastPipeline::new(config).unwrap();
    assert!(matches!(
        pipeline.generate_forecast(&panel, &prices, &request(2)),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_short_panel_fails_without_partial_output() {
    let panel = common::synthetic_panel(10, 7);
    let prices = common::synthetic_prices(&panel, 8);
    let pipeline = ForecastPipeline::new(small_config()).unwrap();
    let result = pipeline.generate_forecast(&panel, &prices, &request(3));
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}
