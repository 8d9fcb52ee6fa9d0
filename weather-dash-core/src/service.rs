//! Query orchestration: cache first, provider on a miss.

use chrono::Utc;

use crate::{
    Config, WeatherError,
    cache::{CacheEntry, WeatherCache},
    config::FetchMode,
    model::{WeatherQuery, WeatherReport},
    provider::{WeatherProvider, provider_from_config},
};

/// Owns the provider and the cache for one dashboard session.
///
/// Identical queries issued concurrently from different services are not
/// coalesced; each does its own cache check and may fetch independently.
#[derive(Debug)]
pub struct WeatherService {
    provider: Box<dyn WeatherProvider>,
    cache: WeatherCache,
    mode: FetchMode,
}

impl WeatherService {
    pub fn new(provider: Box<dyn WeatherProvider>, cache: WeatherCache) -> Self {
        Self {
            provider,
            cache,
            mode: FetchMode::Sequential,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(config)?;
        let cache = WeatherCache::new(config.cache_duration());
        Ok(Self::new(provider, cache).with_fetch_mode(config.fetch_mode))
    }

    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut WeatherCache {
        &mut self.cache
    }

    /// Current conditions and forecast for `query`.
    ///
    /// A fresh cached pair is returned without touching the network.
    /// Otherwise both payloads are fetched; the pair is cached only if both
    /// calls succeed.
    pub async fn get_weather(&mut self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        let key = query.cache_key();

        if let Some(entry) = self.cache.lookup(&key) {
            tracing::debug!(location = %query, "using cached data");
            return Ok(entry.report());
        }

        let report = self.fetch(query).await?;
        tracing::info!(location = %query, "fetched fresh weather data");

        self.cache.store(key, CacheEntry::new(report.clone(), Utc::now()));
        Ok(report)
    }

    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        match self.mode {
            FetchMode::Sequential => {
                let current = self.provider.current(query).await?;
                let forecast = self.provider.forecast(query).await?;
                Ok(WeatherReport { current, forecast })
            }
            FetchMode::Concurrent => {
                let (current, forecast) =
                    tokio::try_join!(self.provider.current(query), self.provider.forecast(query))?;
                Ok(WeatherReport { current, forecast })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Endpoint, QueryErrorKind};
    use crate::model::{
        Condition, CurrentWeatherPayload, ForecastCity, ForecastPayload, MainReadings, Sys, Wind,
    };
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Calls {
        current: AtomicU32,
        forecast: AtomicU32,
    }

    #[derive(Debug)]
    struct FakeProvider {
        calls: Arc<Calls>,
        current_status: Option<StatusCode>,
        forecast_status: Option<StatusCode>,
    }

    impl FakeProvider {
        fn ok(calls: Arc<Calls>) -> Self {
            Self { calls, current_status: None, forecast_status: None }
        }
    }

    fn current(name: &str) -> CurrentWeatherPayload {
        CurrentWeatherPayload {
            name: name.to_string(),
            sys: Sys { country: Some("FR".to_string()) },
            coord: None,
            weather: vec![Condition {
                id: Some(800),
                main: "Clear".to_string(),
                description: "clear sky".to_string(),
                icon: "01d".to_string(),
            }],
            main: MainReadings { temp: 18.2, feels_like: 17.5, humidity: 60, pressure: 1012.0 },
            wind: Wind { speed: 3.0, deg: None },
            dt: 1_760_000_000,
            timezone: Some(7200),
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current(&self, query: &WeatherQuery) -> Result<CurrentWeatherPayload, WeatherError> {
            self.calls.current.fetch_add(1, Ordering::SeqCst);
            match self.current_status {
                Some(status) => Err(WeatherError::from_status(Endpoint::Current, status)),
                None => Ok(current(&query.to_string())),
            }
        }

        async fn forecast(&self, query: &WeatherQuery) -> Result<ForecastPayload, WeatherError> {
            self.calls.forecast.fetch_add(1, Ordering::SeqCst);
            match self.forecast_status {
                Some(status) => Err(WeatherError::from_status(Endpoint::Forecast, status)),
                None => Ok(ForecastPayload {
                    list: vec![],
                    city: ForecastCity {
                        name: query.to_string(),
                        country: "FR".to_string(),
                        timezone: Some(7200),
                    },
                }),
            }
        }
    }

    fn service(provider: FakeProvider) -> WeatherService {
        WeatherService::new(Box::new(provider), WeatherCache::new(Duration::from_secs(600)))
    }

    #[tokio::test]
    async fn cold_cache_fetches_both_then_serves_from_cache() {
        let calls = Arc::new(Calls::default());
        let mut svc = service(FakeProvider::ok(calls.clone()));
        let query = WeatherQuery::place("Paris").unwrap();

        let first = svc.get_weather(&query).await.unwrap();
        assert_eq!(calls.current.load(Ordering::SeqCst), 1);
        assert_eq!(calls.forecast.load(Ordering::SeqCst), 1);

        let again = svc.get_weather(&WeatherQuery::place("paris").unwrap()).await.unwrap();
        assert_eq!(again, first);
        assert_eq!(calls.current.load(Ordering::SeqCst), 1);
        assert_eq!(calls.forecast.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_entry_triggers_refetch() {
        let calls = Arc::new(Calls::default());
        let mut svc = service(FakeProvider::ok(calls.clone()));
        let query = WeatherQuery::place("Paris").unwrap();

        let report = svc.get_weather(&query).await.unwrap();
        let old = Utc::now() - chrono::Duration::seconds(601);
        svc.cache_mut().store(query.cache_key(), CacheEntry::new(report, old));

        svc.get_weather(&query).await.unwrap();
        assert_eq!(calls.current.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn coordinates_do_not_hit_place_cache() {
        let calls = Arc::new(Calls::default());
        let mut svc = service(FakeProvider::ok(calls.clone()));

        svc.get_weather(&WeatherQuery::place("Paris").unwrap()).await.unwrap();
        svc.get_weather(&WeatherQuery::coordinates(48.8566, 2.3522).unwrap()).await.unwrap();
        svc.get_weather(&WeatherQuery::coordinates(48.8566, 2.3522).unwrap()).await.unwrap();

        assert_eq!(calls.current.load(Ordering::SeqCst), 2);
        assert_eq!(svc.cache().len(), 2);
    }

    #[tokio::test]
    async fn not_found_skips_forecast_and_caches_nothing() {
        let calls = Arc::new(Calls::default());
        let mut svc = service(FakeProvider {
            calls: calls.clone(),
            current_status: Some(StatusCode::NOT_FOUND),
            forecast_status: None,
        });

        let err = svc.get_weather(&WeatherQuery::place("Atlantis").unwrap()).await.unwrap_err();

        assert_eq!(err.query_kind(), Some(QueryErrorKind::NotFound));
        assert_eq!(calls.forecast.load(Ordering::SeqCst), 0);
        assert!(svc.cache().is_empty());
    }

    #[tokio::test]
    async fn forecast_failure_fails_whole_query() {
        let calls = Arc::new(Calls::default());
        let mut svc = service(FakeProvider {
            calls: calls.clone(),
            current_status: None,
            forecast_status: Some(StatusCode::NOT_FOUND),
        });

        let err = svc.get_weather(&WeatherQuery::place("Paris").unwrap()).await.unwrap_err();

        assert_eq!(err.query_kind(), Some(QueryErrorKind::Other));
        assert!(svc.cache().is_empty());
    }

    #[tokio::test]
    async fn concurrent_mode_requires_both() {
        let calls = Arc::new(Calls::default());
        let mut svc = service(FakeProvider::ok(calls.clone())).with_fetch_mode(FetchMode::Concurrent);

        svc.get_weather(&WeatherQuery::place("Paris").unwrap()).await.unwrap();
        assert_eq!(calls.current.load(Ordering::SeqCst), 1);
        assert_eq!(calls.forecast.load(Ordering::SeqCst), 1);

        let failing = Arc::new(Calls::default());
        let mut svc = service(FakeProvider {
            calls: failing,
            current_status: None,
            forecast_status: Some(StatusCode::INTERNAL_SERVER_ERROR),
        })
        .with_fetch_mode(FetchMode::Concurrent);

        assert!(svc.get_weather(&WeatherQuery::place("Paris").unwrap()).await.is_err());
        assert!(svc.cache().is_empty());
    }
}
