//! Error taxonomy for the retrieval path.

use reqwest::StatusCode;
use thiserror::Error;

/// Which provider endpoint an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing category of an HTTP error status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    NotFound,
    Credentials,
    RateLimited,
    Unavailable,
    Other,
}

impl QueryErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 | 404 => QueryErrorKind::NotFound,
            401 => QueryErrorKind::Credentials,
            429 => QueryErrorKind::RateLimited,
            500..=599 => QueryErrorKind::Unavailable,
            _ => QueryErrorKind::Other,
        }
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("request failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}")]
    Query {
        endpoint: Endpoint,
        status: StatusCode,
        kind: QueryErrorKind,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl WeatherError {
    /// Build a query error for a non-2xx response.
    ///
    /// Only the current-conditions call is classified by status; a failing
    /// forecast call is reported as a generic failure.
    pub fn from_status(endpoint: Endpoint, status: StatusCode) -> Self {
        let kind = match endpoint {
            Endpoint::Current => QueryErrorKind::from_status(status),
            Endpoint::Forecast => QueryErrorKind::Other,
        };
        WeatherError::Query {
            endpoint,
            status,
            kind,
        }
    }

    pub fn query_kind(&self) -> Option<QueryErrorKind> {
        match self {
            WeatherError::Query { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, WeatherError::Transport { .. })
    }

    /// Message suitable for showing to the person who typed the query.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::Query { status, kind, .. } => match kind {
                QueryErrorKind::NotFound if *status == StatusCode::BAD_REQUEST => {
                    "Invalid city name. Please check your spelling.".to_string()
                }
                QueryErrorKind::NotFound => {
                    "City not found. Please try a different city.".to_string()
                }
                QueryErrorKind::Credentials => {
                    "Invalid API key. Please check your configuration.".to_string()
                }
                QueryErrorKind::RateLimited => {
                    "Too many requests. Please try again later.".to_string()
                }
                QueryErrorKind::Unavailable => {
                    "Weather service temporarily unavailable.".to_string()
                }
                QueryErrorKind::Other => {
                    "Unable to fetch weather data. Please try again.".to_string()
                }
            },
            WeatherError::Transport { .. } => {
                "Network error. Check your connection and try again.".to_string()
            }
            WeatherError::Decode { .. } => {
                "Unable to fetch weather data. Please try again.".to_string()
            }
            WeatherError::InvalidQuery(msg) => msg.clone(),
        }
    }
}
