use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// What the user asked for: a place name or a coordinate pair.
///
/// Build it with [`WeatherQuery::place`] or [`WeatherQuery::coordinates`],
/// which validate input. Variants built directly are still trimmed when
/// keyed and sent.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    Place(String),
    Coordinates { lat: f64, lon: f64 },
}

impl WeatherQuery {
    pub fn place(name: &str) -> Result<Self, WeatherError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WeatherError::InvalidQuery("Please enter a city name".to_string()));
        }
        Ok(WeatherQuery::Place(name.to_string()))
    }

    pub fn coordinates(lat: f64, lon: f64) -> Result<Self, WeatherError> {
        let valid = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon);
        if !valid {
            return Err(WeatherError::InvalidQuery(format!(
                "Coordinates out of range: {lat}, {lon}"
            )));
        }
        Ok(WeatherQuery::Coordinates { lat, lon })
    }

    /// Normalized cache key. Place names and coordinates never share a key.
    pub fn cache_key(&self) -> CacheKey {
        match self {
            WeatherQuery::Place(name) => CacheKey::Place(name.trim().to_lowercase()),
            WeatherQuery::Coordinates { lat, lon } => CacheKey::Coordinates(format!(
                "{:.4},{:.4}",
                key_degrees(*lat),
                key_degrees(*lon)
            )),
        }
    }

    /// Query-string parameters that select the location on the provider side.
    pub fn location_params(&self) -> Vec<(&'static str, String)> {
        match self {
            WeatherQuery::Place(name) => vec![("q", name.trim().to_string())],
            WeatherQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }
}

/// Degrees snapped to four decimals. Adding `0.0` turns `-0.0` into `0.0`
/// so both signs of zero share a key.
fn key_degrees(value: f64) -> f64 {
    (value * 1e4).round() / 1e4 + 0.0
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherQuery::Place(name) => f.write_str(name),
            WeatherQuery::Coordinates { lat, lon } => write!(f, "{lat:.4}, {lon:.4}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Place(String),
    Coordinates(String),
}

/// Unit system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial, standard."
            )),
        }
    }
}

/// One entry of the provider's `weather` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl Condition {
    pub fn unknown() -> Self {
        Self {
            id: None,
            main: "Unknown".to_string(),
            description: "unknown".to_string(),
            icon: String::new(),
        }
    }

    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    #[serde(default)]
    pub pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Sys {
    #[serde(default)]
    pub country: Option<String>,
}

/// Current-conditions payload (`/weather`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeatherPayload {
    pub name: String,
    #[serde(default)]
    pub sys: Sys,
    #[serde(default)]
    pub coord: Option<Coord>,
    pub weather: Vec<Condition>,
    pub main: MainReadings,
    pub wind: Wind,
    pub dt: i64,
    #[serde(default)]
    pub timezone: Option<i32>,
}

impl CurrentWeatherPayload {
    /// "Paris, FR", or just the name when the country is absent.
    pub fn location_label(&self) -> String {
        match self.sys.country.as_deref() {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }

    pub fn condition(&self) -> Condition {
        self.weather.first().cloned().unwrap_or_else(Condition::unknown)
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: MainReadings,
    pub weather: Vec<Condition>,
    pub wind: Wind,
    #[serde(default)]
    pub dt_txt: Option<String>,
}

impl ForecastEntry {
    /// `None` when the timestamp is out of chrono's range.
    pub fn to_sample(&self) -> Option<ForecastSample> {
        let timestamp = DateTime::from_timestamp(self.dt, 0)?;
        Some(ForecastSample {
            timestamp,
            temperature: self.main.temp,
            condition: self.weather.first().cloned().unwrap_or_else(Condition::unknown),
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    #[serde(default)]
    pub country: String,
    /// Offset from UTC in seconds.
    #[serde(default)]
    pub timezone: Option<i32>,
}

/// Five-day / three-hour forecast payload (`/forecast`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub list: Vec<ForecastEntry>,
    pub city: ForecastCity,
}

impl ForecastPayload {
    pub fn samples(&self) -> Vec<ForecastSample> {
        self.list.iter().filter_map(ForecastEntry::to_sample).collect()
    }

    /// The forecast location's own UTC offset, if the provider sent one.
    pub fn city_offset(&self) -> Option<FixedOffset> {
        self.city.timezone.and_then(FixedOffset::east_opt)
    }
}

/// A single three-hour forecast point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub condition: Condition,
    pub humidity: u8,
    pub wind_speed: f64,
}

/// Both payloads for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub current: CurrentWeatherPayload,
    pub forecast: ForecastPayload,
}
