use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use floodmap_core::{
    Config, Coordinate, DEFAULT_HISTORY_DAYS, DEFAULT_ZONE_RADIUS_KM, FloodRiskApi,
    FloodRiskClient, Units, WeatherClient,
};
use inquire::{Password, Select, Text};
use rand::{SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "floodmap", version, about = "Flood risk and weather lookups")]
pub struct Cli {
    /// Print the raw JSON result instead of a summary.
    #[arg(long, global = true)]
    pub json: bool,

    /// Seed for the mock data served when the flood API is unavailable.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct Location {
    /// Latitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub lat: f64,

    /// Longitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub lon: f64,
}

impl Location {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure API endpoints and the weather API key.
    Configure,

    /// Show the current flood risk at a point.
    Risk {
        #[command(flatten)]
        at: Location,
    },

    /// Show the daily flood history of a region.
    History {
        /// Region name, e.g. "Illinois River".
        region: String,

        /// Number of days to look back.
        #[arg(long, default_value_t = DEFAULT_HISTORY_DAYS)]
        days: u32,
    },

    /// List flood risk zones around a point.
    Zones {
        #[command(flatten)]
        at: Location,

        /// Search radius in kilometres.
        #[arg(long, default_value_t = DEFAULT_ZONE_RADIUS_KM, value_parser = parse_finite)]
        radius: f64,
    },

    /// Show the current weather at a point.
    Weather {
        #[command(flatten)]
        at: Location,

        /// standard, metric or imperial; defaults to the configured units.
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let Cli { json, seed, command } = self;
        debug!(?command, json, ?seed, "running command");

        match command {
            Command::Configure => configure(),
            Command::Risk { at } => {
                let config = Config::load()?;
                let reading = flood_client(&config, seed).fetch_current_risk(at.coordinate()).await;
                output::emit(json, &reading, output::reading)
            }
            Command::History { region, days } => {
                let config = Config::load()?;
                let points = flood_client(&config, seed).fetch_history(&region, days).await;
                output::emit(json, &points, |p| output::history(&region, p))
            }
            Command::Zones { at, radius } => {
                let config = Config::load()?;
                let zones = flood_client(&config, seed)
                    .fetch_risk_zones(at.coordinate(), radius)
                    .await;
                output::emit(json, &zones, output::zones)
            }
            Command::Weather { at, units } => {
                let config = Config::load()?;
                let client = WeatherClient::from_config(&config)?;
                let units = units.unwrap_or(config.weather.units);
                let weather = client
                    .fetch_forecast(at.coordinate(), units)
                    .await
                    .context("Weather lookup failed")?;
                output::emit(json, &weather, |w| output::weather(w, units))
            }
        }
    }
}

fn flood_client(config: &Config, seed: Option<u64>) -> FloodRiskClient {
    match seed {
        Some(seed) => FloodRiskClient::with_source(
            FloodRiskApi::new(&config.flood.base_url),
            StdRng::seed_from_u64(seed),
        ),
        None => FloodRiskClient::from_config(config),
    }
}

/// Prompt for every setting, keeping current values on empty input.
fn configure() -> Result<()> {
    let mut config = Config::load_file()?;

    config.flood.base_url = Text::new("Flood API base URL:")
        .with_default(&config.flood.base_url)
        .prompt()
        .context("Failed to read flood API base URL")?;

    config.weather.base_url = Text::new("Weather API endpoint:")
        .with_default(&config.weather.base_url)
        .prompt()
        .context("Failed to read weather API endpoint")?;

    let key = Password::new("Weather API key (leave empty to keep current):")
        .without_confirmation()
        .prompt()
        .context("Failed to read weather API key")?;
    if !key.trim().is_empty() {
        config.set_weather_api_key(key.trim().to_string());
    }

    let units = Units::all().to_vec();
    let current = units.iter().position(|u| *u == config.weather.units).unwrap_or(0);
    config.weather.units = Select::new("Default units:", units)
        .with_starting_cursor(current)
        .prompt()
        .context("Failed to read units")?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

fn parse_finite(value: &str) -> Result<f64, String> {
    let parsed: f64 = value.parse().map_err(|_| format!("'{value}' is not a number"))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(format!("'{value}' is not a finite number"))
    }
}

fn parse_units(value: &str) -> Result<Units, String> {
    Units::try_from(value).map_err(|e| e.to_string())
}
