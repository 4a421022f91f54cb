//! Prompt templates for the model-backed stages.

use arbor_weather::WeatherSnapshot;

/// Two-label intent classification over the raw query.
pub(crate) fn classify_intent(query: &str) -> String {
    format!(
        "You are an intent classifier. Analyze the user's query and classify it as either:\n\
         - \"weather\": if asking about weather, temperature, climate, or meteorological conditions\n\
         - \"document\": if asking about document content, PDFs, or general knowledge questions\n\
         \n\
         Respond with ONLY one word: either \"weather\" or \"document\"\n\
         \n\
         Query: {query}\n\
         \n\
         Intent:"
    )
}

/// City extraction from a weather query.
pub(crate) fn extract_city(query: &str) -> String {
    format!(
        "Extract ONLY the city name from this weather query.\n\
         Respond with just the city name, nothing else.\n\
         \n\
         Query: {query}\n\
         \n\
         City:"
    )
}

/// Conversational phrasing of a fetched weather snapshot.
pub(crate) fn weather_reply(query: &str, snapshot: &WeatherSnapshot) -> String {
    format!(
        "You are a helpful weather assistant. Based on the weather data below, provide a \
         natural, conversational response to the user's question.\n\
         \n\
         User question: {query}\n\
         \n\
         Weather data:\n{}",
        format_snapshot(snapshot)
    )
}

/// Human-readable rendering of a snapshot, one field per line.
pub(crate) fn format_snapshot(snapshot: &WeatherSnapshot) -> String {
    format!(
        "City: {}, {}\n\
         Temperature: {}°C\n\
         Feels like: {}°C\n\
         Conditions: {}\n\
         Humidity: {}%\n\
         Wind speed: {} m/s",
        snapshot.city,
        snapshot.country,
        snapshot.temperature,
        snapshot.feels_like,
        snapshot.description,
        snapshot.humidity,
        snapshot.wind_speed
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Tokyo".into(),
            country: "JP".into(),
            temperature: 22.0,
            feels_like: 21.4,
            humidity: 60.0,
            description: "clear sky".into(),
            wind_speed: 3.5,
        }
    }

    #[test]
    fn snapshot_renders_every_field() {
        let text = format_snapshot(&snapshot());
        assert!(text.contains("City: Tokyo, JP"));
        assert!(text.contains("Temperature: 22°C"));
        assert!(text.contains("Feels like: 21.4°C"));
        assert!(text.contains("Conditions: clear sky"));
        assert!(text.contains("Humidity: 60%"));
        assert!(text.contains("Wind speed: 3.5 m/s"));
    }

    #[test]
    fn classifier_prompt_embeds_the_query() {
        let prompt = classify_intent("Weather in Tokyo?");
        assert!(prompt.contains("Query: Weather in Tokyo?"));
        assert!(prompt.contains("ONLY one word"));
    }
}
