use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use skycast_core::{App, Config};
use skycast_ui::AppServices;

#[derive(Parser)]
#[command(name = "skycast", version, about = "Current conditions, hourly forecasts and saved locations")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show current conditions
    Current(LocationArgs),
    /// Show hourly temperatures and conditions
    Hourly(ForecastArgs),
    /// Show hourly chance of precipitation
    Rain(ForecastArgs),
    /// Save a location
    Save(SaveArgs),
    /// Remove a saved location
    Remove(LocationArgs),
    /// List saved locations
    List,
}

#[derive(Args)]
struct LocationArgs {
    #[arg(long, allow_negative_numbers = true)]
    lat: String,
    #[arg(long, allow_negative_numbers = true)]
    lon: String,
}

#[derive(Args)]
struct ForecastArgs {
    #[command(flatten)]
    location: LocationArgs,
    /// First day to show (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Number of days, defaults to `weather.forecast_days`
    #[arg(long)]
    days: Option<u32>,
}

#[derive(Args)]
struct SaveArgs {
    #[command(flatten)]
    location: LocationArgs,
    /// Name to save under, defaults to the name the weather lookup reports
    #[arg(long)]
    name: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    skycast_core::init_with_level(&config.logging.level)?;

    let app = App::with_config(config)?;
    app.initialize()?;

    let services = AppServices::from_config(app.config())?;
    tracing::info!("SkyCast started");

    let result = run(cli.command, &app, &services);

    services.shutdown();
    app.shutdown()?;
    result
}

fn run(command: Command, app: &App, services: &AppServices) -> Result<()> {
    let repo = services.repository();
    let runtime = services.runtime();

    match command {
        Command::Current(loc) => {
            let details = runtime
                .block_on(repo.fetch_weather_for_location(&loc.lat, &loc.lon))
                .context("Failed to fetch current weather")?;

            println!("{}", details.name_of_location);
            println!("  {}°  {}", details.temperature, details.weather_condition);
            println!(
                "  {} ({})",
                details.icon.resource_name(),
                if details.is_day { "day" } else { "night" }
            );
        }
        Command::Hourly(args) => {
            let (start, end) = forecast_window(&args, app.config())?;
            let forecasts = runtime
                .block_on(repo.fetch_hourly_forecasts(
                    &args.location.lat,
                    &args.location.lon,
                    start,
                    end,
                ))
                .context("Failed to fetch hourly forecast")?;

            for f in forecasts {
                println!(
                    "{}  {:>2} {}  {:>4}  {}",
                    f.date_time.format("%a %d"),
                    f.hour,
                    if f.is_am { "AM" } else { "PM" },
                    f.temperature_string,
                    f.weather_icon.resource_name()
                );
            }
        }
        Command::Rain(args) => {
            let (start, end) = forecast_window(&args, app.config())?;
            let probabilities = runtime
                .block_on(repo.fetch_precipitation_probabilities(
                    &args.location.lat,
                    &args.location.lon,
                    start,
                    end,
                ))
                .context("Failed to fetch precipitation forecast")?;

            for p in probabilities {
                println!(
                    "{}  {:>3}%",
                    p.date_time.format("%a %d %I %p"),
                    p.probability_percentage
                );
            }
        }
        Command::Save(args) => {
            let LocationArgs { lat, lon } = args.location;
            let name = match args.name {
                Some(name) => name,
                None => {
                    runtime
                        .block_on(repo.fetch_weather_for_location(&lat, &lon))
                        .context("Failed to look up location name")?
                        .name_of_location
                }
            };

            let saved = repo
                .save_weather_location(&name, &lat, &lon)
                .context("Failed to save location")?;
            println!("Saved {} ({}, {})", saved.name_of_location, saved.latitude, saved.longitude);
        }
        Command::Remove(loc) => {
            repo.delete_weather_location(&loc.lat, &loc.lon)
                .context("Failed to remove location")?;
            println!("Removed {}, {}", loc.lat, loc.lon);
        }
        Command::List => {
            let locations = repo.saved_locations().context("Failed to read saved locations")?;
            if locations.is_empty() {
                println!("No saved locations");
            }
            for l in locations {
                println!("{}  ({})", l.name_of_location, l.coordinates);
            }
        }
    }

    Ok(())
}

/// Inclusive date range for hourly commands.
fn forecast_window(args: &ForecastArgs, config: &Config) -> Result<(NaiveDate, NaiveDate)> {
    let start = args.date.unwrap_or_else(|| Local::now().date_naive());
    let days = args.days.unwrap_or(config.weather.forecast_days).max(1);
    let end = start
        .checked_add_days(Days::new(u64::from(days - 1)))
        .context("Forecast range is out of bounds")?;
    Ok((start, end))
}
