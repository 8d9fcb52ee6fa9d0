use crate::{
    Config, WeatherError,
    model::{CurrentWeatherPayload, ForecastPayload, WeatherQuery},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of the two payloads the dashboard needs.
///
/// Implementations must report a non-2xx response as
/// [`WeatherError::Query`] and a network failure (after retries) as
/// [`WeatherError::Transport`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &WeatherQuery) -> Result<CurrentWeatherPayload, WeatherError>;

    async fn forecast(&self, query: &WeatherQuery) -> Result<ForecastPayload, WeatherError>;
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::from_config(config)?;
    Ok(Box::new(provider))
}
