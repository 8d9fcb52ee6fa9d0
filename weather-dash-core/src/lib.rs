//! Core library for the `weather-dash` dashboard.
//!
//! This crate defines:
//! - Fetching with retry on transport failure
//! - A time-boxed cache of (current, forecast) pairs
//! - Per-day aggregation of the three-hour forecast
//! - The orchestrator that ties them to a weather provider
//!
//! It carries no presentation code; `weather-dash-cli` renders what it returns.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod provider;
pub mod service;

pub use aggregate::{
    DayBucket, TrendPoint, daily_outlook, group_by_day, group_by_day_in, round_half_up,
    temperature_trend,
};
pub use cache::{CacheEntry, WeatherCache};
pub use config::{Config, FetchMode};
pub use error::{Endpoint, QueryErrorKind, WeatherError};
pub use fetch::{RetryPolicy, fetch_with_retry};
pub use model::{
    CacheKey, Condition, CurrentWeatherPayload, ForecastPayload, ForecastSample, Units,
    WeatherQuery, WeatherReport,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use service::WeatherService;
