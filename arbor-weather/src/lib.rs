//! # arbor-weather
//!
//! A thin client for the OpenWeatherMap current-weather endpoint.
//!
//! [`WeatherClient`] makes exactly one outbound call per
//! [`fetch`](WeatherProvider::fetch) — no retries, no caching — with a
//! bounded wait, and normalizes the response JSON into a flat
//! [`WeatherSnapshot`]. Every failure (transport, timeout, non-success
//! status, missing response field) surfaces as a [`WeatherError`]; the
//! caller decides fallback behavior.

mod client;
mod error;
mod snapshot;

pub use client::{WeatherClient, WeatherProvider};
pub use error::{Result, WeatherError};
pub use snapshot::WeatherSnapshot;
