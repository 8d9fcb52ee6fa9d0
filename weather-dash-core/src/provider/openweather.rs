use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::{
    Config,
    error::{Endpoint, WeatherError},
    fetch::{RetryPolicy, fetch_with_retry},
    model::{CurrentWeatherPayload, ForecastPayload, Units, WeatherQuery},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: Url,
    units: Units,
    retry: RetryPolicy,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: Url, units: Units) -> Self {
        Self {
            api_key,
            base_url,
            units,
            retry: RetryPolicy::default(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key()?.to_owned();
        let base_url = parse_base_url(&config.base_url)?;

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url,
            units: config.units,
            retry: config.retry_policy(),
            http,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// `{base_url}/{path}?<location>&appid=..&units=..`
    fn endpoint_url(&self, path: &str, query: &WeatherQuery) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        url.query_pairs_mut()
            .extend_pairs(query.location_params())
            .append_pair("appid", &self.api_key)
            .append_pair("units", self.units.as_str());
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path: &str,
        query: &WeatherQuery,
    ) -> Result<T, WeatherError> {
        let url = self.endpoint_url(path, query);
        tracing::debug!(%endpoint, path = url.path(), location = %query, "requesting");

        let res = fetch_with_retry(&self.http, &url, &self.retry).await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::debug!(%endpoint, %status, body = %truncate_body(&body), "provider error");
            return Err(WeatherError::from_status(endpoint, status));
        }

        let body = res
            .bytes()
            .await
            .map_err(|source| WeatherError::Transport { attempts: 1, source })?;

        serde_json::from_slice(&body).map_err(|source| WeatherError::Decode { endpoint, source })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &WeatherQuery) -> Result<CurrentWeatherPayload, WeatherError> {
        self.get_json(Endpoint::Current, "weather", query).await
    }

    async fn forecast(&self, query: &WeatherQuery) -> Result<ForecastPayload, WeatherError> {
        self.get_json(Endpoint::Forecast, "forecast", query).await
    }
}

fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid base URL '{raw}'"))?;
    if url.cannot_be_a_base() {
        return Err(anyhow!("Invalid base URL '{raw}': cannot carry a path"));
    }
    Ok(url)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
