//! HTTP GET with retry on transport failure.
//!
//! Only transport-level failures (connect errors, timeouts, broken bodies
//! before headers arrive) are retried. A response with any status code is
//! handed back to the caller, which decides what a 4xx/5xx means.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, Url};

use crate::error::WeatherError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never below 1.
    pub max_attempts: u32,
    /// Delay unit; the wait after attempt `n` is `base_delay * n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Error from [`retry`] once every attempt has failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Run `operation` until it succeeds or `policy.max_attempts` is reached.
///
/// The closure receives the 1-based attempt number.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("Request succeeded on attempt {attempt}");
                }
                return Ok(value);
            }
            Err(e) if attempt >= max_attempts => {
                tracing::error!("All {max_attempts} attempt(s) failed, last error: {e}");
                return Err(Exhausted {
                    attempts: attempt,
                    last_error: e,
                });
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    "Attempt {attempt} of {max_attempts} failed: {e}; retrying in {delay:?}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// GET `url`, retrying transport failures according to `policy`.
pub async fn fetch_with_retry(
    client: &Client,
    url: &Url,
    policy: &RetryPolicy,
) -> Result<Response, WeatherError> {
    retry(policy, |_| client.get(url.clone()).send())
        .await
        .map_err(|e| WeatherError::Transport {
            attempts: e.attempts,
            source: e.last_error,
        })
}
