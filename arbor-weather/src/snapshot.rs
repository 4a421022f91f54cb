//! Normalized weather record and response parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, WeatherError};

/// A flat, normalized view of one current-weather response.
///
/// Produced by [`WeatherClient`](crate::WeatherClient), consumed only by
/// response generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Resolved city name as reported by the service.
    pub city: String,
    /// ISO country code.
    pub country: String,
    /// Temperature in °C.
    pub temperature: f64,
    /// Perceived temperature in °C.
    pub feels_like: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Short condition description, e.g. "clear sky".
    pub description: String,
    /// Wind speed in m/s.
    pub wind_speed: f64,
}

/// Walk a dotted path through the body; numeric segments index into arrays.
fn lookup<'a>(body: &'a Value, path: &'static str) -> Result<&'a Value> {
    let mut current = body;
    for segment in path.split('.') {
        current = match segment.parse::<usize>() {
            Ok(index) => current.get(index),
            Err(_) => current.get(segment),
        }
        .ok_or(WeatherError::MissingField(path))?;
    }
    Ok(current)
}

fn string_field(body: &Value, path: &'static str) -> Result<String> {
    lookup(body, path)?
        .as_str()
        .map(str::to_string)
        .ok_or(WeatherError::MissingField(path))
}

fn number_field(body: &Value, path: &'static str) -> Result<f64> {
    lookup(body, path)?.as_f64().ok_or(WeatherError::MissingField(path))
}

impl WeatherSnapshot {
    /// Normalize a raw current-weather response body.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::MissingField`] naming the first absent or
    /// mistyped field.
    pub fn from_response(body: &Value) -> Result<Self> {
        Ok(Self {
            city: string_field(body, "name")?,
            country: string_field(body, "sys.country")?,
            temperature: number_field(body, "main.temp")?,
            feels_like: number_field(body, "main.feels_like")?,
            humidity: number_field(body, "main.humidity")?,
            description: string_field(body, "weather.0.description")?,
            wind_speed: number_field(body, "wind.speed")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_body() -> Value {
        json!({
            "name": "Tokyo",
            "sys": {"country": "JP"},
            "main": {"temp": 22.0, "feels_like": 21.4, "humidity": 60},
            "weather": [{"description": "clear sky"}],
            "wind": {"speed": 3.5}
        })
    }

    #[test]
    fn normalizes_full_response() {
        let snapshot = WeatherSnapshot::from_response(&full_body()).unwrap();
        assert_eq!(snapshot.city, "Tokyo");
        assert_eq!(snapshot.country, "JP");
        assert_eq!(snapshot.temperature, 22.0);
        assert_eq!(snapshot.feels_like, 21.4);
        assert_eq!(snapshot.humidity, 60.0);
        assert_eq!(snapshot.description, "clear sky");
        assert_eq!(snapshot.wind_speed, 3.5);
    }

    #[test]
    fn each_missing_field_is_named() {
        let cases = [
            ("name", "/name"),
            ("sys.country", "/sys"),
            ("main.temp", "/main/temp"),
            ("main.feels_like", "/main/feels_like"),
            ("main.humidity", "/main/humidity"),
            ("weather.0.description", "/weather"),
            ("wind.speed", "/wind"),
        ];

        for (expected_path, pointer) in cases {
            let mut body = full_body();
            remove_pointer(&mut body, pointer);
            match WeatherSnapshot::from_response(&body) {
                Err(WeatherError::MissingField(path)) => assert_eq!(path, expected_path),
                other => panic!("expected MissingField for {expected_path}, got {other:?}"),
            }
        }
    }

    #[test]
    fn mistyped_field_is_missing() {
        let mut body = full_body();
        body["main"]["temp"] = json!("warm");
        match WeatherSnapshot::from_response(&body) {
            Err(WeatherError::MissingField("main.temp")) => {}
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn empty_weather_array_is_missing() {
        let mut body = full_body();
        body["weather"] = json!([]);
        assert!(matches!(
            WeatherSnapshot::from_response(&body),
            Err(WeatherError::MissingField("weather.0.description"))
        ));
    }

    fn remove_pointer(body: &mut Value, pointer: &str) {
        let (parent, key) = pointer.rsplit_once('/').unwrap();
        let target = if parent.is_empty() { &mut *body } else { body.pointer_mut(parent).unwrap() };
        target.as_object_mut().unwrap().remove(key);
    }
}
