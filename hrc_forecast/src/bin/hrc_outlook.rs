//! hrc_outlook CLI - China and Japan HRC scenario forecasts

use anyhow::Context;
use clap::Parser;
use hrc_forecast::{
    Country, DataLoader, ForecastPipeline, ForecastRequest, PipelineConfig, ScenarioDrivers,
};
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "hrc_outlook")]
#[command(about = "Forecast China and Japan HRC prices under base, upside and downside scenarios")]
struct Cli {
    /// Monthly driver panel (CSV)
    #[arg(long, value_name = "PATH")]
    panel: PathBuf,

    /// Paired China/Japan HRC prices (CSV)
    #[arg(long, value_name = "PATH")]
    prices: PathBuf,

    /// Pipeline configuration (TOML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Forecast months after the anchor month
    #[arg(long)]
    horizon: Option<usize>,

    /// Upside iron ore, coking coal, scrap, export %, FAI growth
    #[arg(long, value_delimiter = ',', default_values_t = [100.0, 220.0, 400.0, 9.0, 5.0])]
    upside: Vec<f64>,

    /// Downside iron ore, coking coal, scrap, export %, FAI growth
    #[arg(long, value_delimiter = ',', default_values_t = [85.0, 180.0, 350.0, 12.0, 1.0])]
    downside: Vec<f64>,

    /// Countries to chart
    #[arg(long, value_delimiter = ',', default_values_t = [String::from("china"), String::from("japan")])]
    countries: Vec<String>,

    /// Skip the Japan model when Japan is not charted
    #[arg(long)]
    skip_unselected: bool,

    /// Write the forecast table to this CSV instead of stdout
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Print the table as JSON
    #[arg(long, conflicts_with = "csv")]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let panel = DataLoader::panel_from_csv(&cli.panel)
        .with_context(|| format!("loading panel {}", cli.panel.display()))?;
    let prices = DataLoader::prices_from_csv(&cli.prices)
        .with_context(|| format!("loading prices {}", cli.prices.display()))?;
    info!(panel_months = panel.len(), price_months = prices.len(), "loaded inputs");

    let countries = cli
        .countries
        .iter()
        .map(|c| c.parse::<Country>())
        .collect::<Result<Vec<_>, _>>()?;

    let request = ForecastRequest {
        upside: ScenarioDrivers::from_slice(&cli.upside)?,
        downside: ScenarioDrivers::from_slice(&cli.downside)?,
        horizon_months: cli.horizon,
        countries,
        skip_unselected: cli.skip_unselected,
    };

    let pipeline = ForecastPipeline::new(config)?;
    let output = pipeline.generate_forecast(&panel, &prices, &request)?;

    if let Some(selection) = &output.lag_selection {
        info!(
            criterion = ?selection.criterion,
            preferred = selection.selected,
            fitted = pipeline.config().var.lag_order,
            "VAR lag order"
        );
    }
    eprint!("China regression\n{}", output.china_fit);
    if let Some(fit) = &output.japan_fit {
        eprint!("Japan regression\n{}", fit);
    }

    match (&cli.csv, cli.json) {
        (Some(path), _) => {
            output.table.write_csv(path)?;
            info!(rows = output.table.len(), path = %path.display(), "wrote forecast table");
        }
        (None, true) => println!("{}", output.table.to_json()?),
        (None, false) => output.table.write_to(io::stdout().lock())?,
    }

    Ok(())
}
