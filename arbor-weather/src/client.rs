//! HTTP client against the OpenWeatherMap current-weather endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::{Result, WeatherError};
use crate::snapshot::WeatherSnapshot;

/// The OpenWeatherMap current-weather endpoint.
const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Bounded wait for the single outbound call. Past this the fetch fails
/// outright; there is no retry.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of current weather by city name.
///
/// The agent pipeline depends on this trait rather than on
/// [`WeatherClient`] so the weather branch can be tested with deterministic
/// stand-ins.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the current weather for a city.
    async fn fetch(&self, city: &str) -> Result<WeatherSnapshot>;
}

/// A [`WeatherProvider`] backed by the OpenWeatherMap HTTP API.
///
/// One GET per fetch with query parameters `q`, `appid`, and
/// `units=metric`. No caching.
pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, api_key: api_key.into(), base_url: WEATHER_URL.into() })
    }

    /// Create a client using the `OPENWEATHERMAP_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENWEATHERMAP_API_KEY").unwrap_or_default();
        Self::new(api_key)
    }

    /// Point the client at a different endpoint URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn fetch(&self, city: &str) -> Result<WeatherSnapshot> {
        debug!(city, "fetching current weather");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| {
                error!(city, error = %e, "weather request failed");
                WeatherError::Request(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(city, %status, "weather service error");
            return Err(WeatherError::Status(status));
        }

        let body: Value = response.json().await?;
        let snapshot = WeatherSnapshot::from_response(&body)?;

        info!(city = %snapshot.city, country = %snapshot.country, "fetched weather");
        Ok(snapshot)
    }
}
