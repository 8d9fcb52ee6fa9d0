use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Select, Text};
use weather_dash_core::{
    Config, Units, WeatherError, WeatherQuery, WeatherReport, WeatherService, daily_outlook,
    temperature_trend,
};

use crate::display;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Weather dashboard in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the OpenWeatherMap API key, unit system and cache duration.
    Configure,

    /// Show current conditions and the outlook for one location.
    Show {
        /// City name, e.g. "Paris" or "Paris,FR".
        #[arg(conflicts_with_all = ["lat", "lon"], required_unless_present = "lat")]
        place: Option<String>,

        /// Latitude in degrees; requires --lon.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in degrees; requires --lat.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Number of days in the outlook.
        #[arg(long, default_value_t = 5)]
        days: usize,

        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Search repeatedly; results are cached for the configured duration.
    Interactive {
        /// Number of days in the outlook.
        #[arg(long, default_value_t = 5)]
        days: usize,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                place,
                lat,
                lon,
                days,
                json,
            } => {
                let config = Config::load()?;
                let query = query_from_args(place, lat, lon)?;
                let mut service = WeatherService::from_config(&config)?;

                let report = service.get_weather(&query).await.map_err(|e| {
                    let message = e.user_message();
                    anyhow::Error::new(e).context(message)
                })?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&report_json(&report, days))?);
                } else {
                    print!("{}", display::render_report(&report, config.units, days));
                }
                Ok(())
            }
            Command::Interactive { days } => interactive(days).await,
        }
    }
}

fn query_from_args(
    place: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> anyhow::Result<WeatherQuery> {
    let query = match (place, lat, lon) {
        (Some(place), _, _) => WeatherQuery::place(&place),
        (None, Some(lat), Some(lon)) => WeatherQuery::coordinates(lat, lon),
        _ => return Err(anyhow!("Give a city name, or both --lat and --lon.")),
    };
    query.map_err(|e| anyhow!(e.user_message()))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    let current_units = Units::all().iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Unit system:", Units::all().to_vec())
        .with_starting_cursor(current_units)
        .prompt()
        .context("Failed to read unit system")?;

    let minutes = CustomType::<u64>::new("Cache duration (minutes):")
        .with_default(config.cache_duration_secs / 60)
        .with_error_message("Please enter a whole number of minutes")
        .prompt()
        .context("Failed to read cache duration")?;
    config.set_cache_minutes(minutes);

    // Validate before persisting.
    config.api_key()?;
    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn interactive(days: usize) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut service = WeatherService::from_config(&config)?;

    loop {
        let input = Text::new("City:")
            .with_help_message("Empty line or Esc to quit")
            .prompt_skippable()
            .context("Failed to read city")?;

        let Some(city) = input.filter(|c| !c.trim().is_empty()) else {
            break;
        };

        match fetch(&mut service, &city).await {
            Ok(report) => print!("{}", display::render_report(&report, config.units, days)),
            Err(e) => {
                tracing::debug!("query failed: {e}");
                eprintln!("{}", e.user_message());
            }
        }
        println!();
    }

    Ok(())
}

async fn fetch(service: &mut WeatherService, city: &str) -> Result<WeatherReport, WeatherError> {
    let query = WeatherQuery::place(city)?;
    service.get_weather(&query).await
}

fn report_json(report: &WeatherReport, days: usize) -> serde_json::Value {
    let (buckets, _) = display::day_buckets(report);
    let outlook: Vec<_> = daily_outlook(&buckets, days)
        .iter()
        .map(|d| {
            serde_json::json!({
                "date": d.date,
                "min": d.min_temp(),
                "max": d.max_temp(),
                "avg": d.avg_temp(),
                "condition": d.condition,
                "icon_url": d.condition.icon_url(),
                "humidity": d.humidity,
                "wind_speed": d.wind_speed,
            })
        })
        .collect();

    serde_json::json!({
        "location": report.current.location_label(),
        "current": report.current,
        "outlook": outlook,
        "trend": temperature_trend(&buckets, days),
    })
}
