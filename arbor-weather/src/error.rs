//! Error type for weather lookups.

use thiserror::Error;

/// Errors that can occur while fetching weather data.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The HTTP request failed (connect, timeout, or body read).
    #[error("Weather request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Weather service returned {0}")]
    Status(reqwest::StatusCode),

    /// An expected field was absent from the response body.
    #[error("Weather response missing field '{0}'")]
    MissingField(&'static str),
}

/// A convenience result type for weather operations.
pub type Result<T> = std::result::Result<T, WeatherError>;
