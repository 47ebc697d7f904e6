use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{SearchLocation, WeatherSnapshot};

pub const BASE_URL: &str = "https://api.weatherapi.com/v1";

pub const MIN_FORECAST_DAYS: u8 = 1;
pub const MAX_FORECAST_DAYS: u8 = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The three upstream endpoints this client speaks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
    Search,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Current => "/current.json",
            Endpoint::Forecast => "/forecast.json",
            Endpoint::Search => "/search.json",
        }
    }

    /// Fixed user-facing message for transport-level failures; no network
    /// detail leaks past this.
    pub fn failure_message(self) -> &'static str {
        match self {
            Endpoint::Current => "Failed to fetch weather data",
            Endpoint::Forecast => "Failed to fetch weather forecast",
            Endpoint::Search => "Failed to search locations",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// Empty or whitespace-only query, rejected before any network call.
    #[error("Please enter a valid location")]
    InvalidQuery,

    /// Upstream returned a structured error payload; its message is passed
    /// through verbatim.
    #[error("{0}")]
    Remote(String),

    /// Network failure, timeout, or an undecodable response.
    #[error("{}", .0.failure_message())]
    Transport(Endpoint),
}

/// Structured error payload: `{"error":{"code":1006,"message":"..."}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    #[allow(dead_code)]
    code: i32,
    message: String,
}

/// Seam between the session and the remote API; implemented by
/// [`WeatherClient`] and by test fakes.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &str) -> Result<WeatherSnapshot, WeatherError>;
    async fn forecast(&self, query: &str, days: u8) -> Result<WeatherSnapshot, WeatherError>;
}

/// HTTP client for the WeatherAPI.com endpoints.
///
/// Every call is a single outbound request with a fixed 10 second timeout:
/// no retries, no caching.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Point the client at a different base URL (tests, proxies).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    /// Fetch current conditions for a free-form query (place name, postal
    /// code, or "lat,lon"). Query format validation is the upstream's job.
    pub async fn current(&self, query: &str) -> Result<WeatherSnapshot, WeatherError> {
        let query = valid_query(query)?;
        self.get_json(Endpoint::Current, &[("q", query), ("aqi", "no")])
            .await
    }

    /// Fetch current conditions plus a `days`-day forecast. `days` is
    /// silently clamped to [1,10] before the request goes out.
    pub async fn forecast(&self, query: &str, days: u8) -> Result<WeatherSnapshot, WeatherError> {
        let query = valid_query(query)?;
        let days = days.clamp(MIN_FORECAST_DAYS, MAX_FORECAST_DAYS).to_string();
        self.get_json(
            Endpoint::Forecast,
            &[("q", query), ("days", &days), ("aqi", "no"), ("alerts", "no")],
        )
        .await
    }

    /// Look up matching locations for a partial query.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchLocation>, WeatherError> {
        let query = valid_query(query)?;
        self.get_json(Endpoint::Search, &[("q", query)]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        debug!(endpoint = endpoint.path(), "requesting weather data");

        let res = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = endpoint.path(), error = %e, "weather request failed");
                WeatherError::Transport(endpoint)
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            warn!(endpoint = endpoint.path(), error = %e, "failed to read response body");
            WeatherError::Transport(endpoint)
        })?;

        if !status.is_success() {
            if let Ok(api_err) = serde_json::from_str::<ApiErrorBody>(&body) {
                warn!(%status, message = %api_err.error.message, "upstream rejected request");
                return Err(WeatherError::Remote(api_err.error.message));
            }
            warn!(%status, endpoint = endpoint.path(), "upstream request failed");
            return Err(WeatherError::Transport(endpoint));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(endpoint = endpoint.path(), error = %e, "failed to decode response");
            WeatherError::Transport(endpoint)
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn current(&self, query: &str) -> Result<WeatherSnapshot, WeatherError> {
        WeatherClient::current(self, query).await
    }

    async fn forecast(&self, query: &str, days: u8) -> Result<WeatherSnapshot, WeatherError> {
        WeatherClient::forecast(self, query, days).await
    }
}

fn valid_query(query: &str) -> Result<&str, WeatherError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(WeatherError::InvalidQuery)
    } else {
        Ok(trimmed)
    }
}
