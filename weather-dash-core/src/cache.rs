//! Time-boxed in-memory cache of fetched report pairs.
//!
//! Staleness is evaluated on read. Nothing is evicted in the background and
//! there is no size bound; a stale entry stays until it is overwritten or
//! [`WeatherCache::purge_stale`] is called.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::model::{CacheKey, CurrentWeatherPayload, ForecastPayload, WeatherReport};

pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub current: CurrentWeatherPayload,
    pub forecast: ForecastPayload,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(report: WeatherReport, fetched_at: DateTime<Utc>) -> Self {
        Self {
            current: report.current,
            forecast: report.forecast,
            fetched_at,
        }
    }

    /// Fresh iff `now - fetched_at < duration`.
    pub fn is_fresh(&self, now: DateTime<Utc>, duration: Duration) -> bool {
        match (now - self.fetched_at).to_std() {
            Ok(age) => age < duration,
            // Clock went backwards; treat as just fetched.
            Err(_) => true,
        }
    }

    pub fn report(&self) -> WeatherReport {
        WeatherReport {
            current: self.current.clone(),
            forecast: self.forecast.clone(),
        }
    }
}

#[derive(Debug)]
pub struct WeatherCache {
    duration: Duration,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DURATION)
    }
}

impl WeatherCache {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            entries: HashMap::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn lookup(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.lookup_at(key, Utc::now())
    }

    pub fn lookup_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<&CacheEntry> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh(now, self.duration) {
            tracing::debug!(?key, "cache hit");
            Some(entry)
        } else {
            tracing::debug!(?key, fetched_at = %entry.fetched_at, "cache entry stale");
            None
        }
    }

    /// Insert or replace the entry for `key`.
    pub fn store(&mut self, key: CacheKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every entry that would miss at `now`. Returns how many were removed.
    pub fn purge_stale(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let duration = self.duration;
        self.entries.retain(|_, entry| entry.is_fresh(now, duration));
        before - self.entries.len()
    }
}
