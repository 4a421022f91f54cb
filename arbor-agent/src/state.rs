//! Pipeline state, intent, and the stage machine.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use arbor_core::ChatMessage;
use arbor_rag::{DocumentAnswer, SourceExcerpt};
use arbor_weather::WeatherSnapshot;

/// The classified purpose of a query.
///
/// `Document` is the fail-safe default: it covers document content and
/// general-knowledge questions, so anything unrecognized routes there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Weather, temperature, or other meteorological questions.
    Weather,
    /// Document content or general-knowledge questions.
    #[default]
    Document,
}

impl Intent {
    /// Normalize a raw classifier output to one of the two labels.
    ///
    /// The output is trimmed and lower-cased; any value other than
    /// `weather` or `document` coerces to `Document`.
    pub fn classify_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "weather" => Intent::Weather,
            _ => Intent::Document,
        }
    }

    /// The persisted label for this intent.
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Weather => "weather",
            Intent::Document => "document",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The nodes of the pipeline state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Initial node: classify the query's intent.
    ClassifyIntent,
    /// Weather branch: extract the city from the query.
    ExtractCity,
    /// Weather branch: fetch the current weather.
    FetchWeather,
    /// Document branch: query the document index.
    QueryDocuments,
    /// Terminal node, converging from both branches.
    GenerateResponse,
    /// The run is complete.
    Done,
}

impl Stage {
    /// The pure routing function over the stage graph.
    ///
    /// The single conditional edge leaves `ClassifyIntent`: `Weather`
    /// routes to the city-extraction path, everything else to the
    /// document path. All other edges are unconditional.
    pub fn next(self, intent: Intent) -> Stage {
        match self {
            Stage::ClassifyIntent => match intent {
                Intent::Weather => Stage::ExtractCity,
                Intent::Document => Stage::QueryDocuments,
            },
            Stage::ExtractCity => Stage::FetchWeather,
            Stage::FetchWeather => Stage::GenerateResponse,
            Stage::QueryDocuments => Stage::GenerateResponse,
            Stage::GenerateResponse => Stage::Done,
            Stage::Done => Stage::Done,
        }
    }
}

/// A stage-local failure, rendered into the state's `error` field.
///
/// Stages never propagate these; the variants exist so every recorded
/// cause string carries a consistent stage prefix.
#[derive(Debug, Error)]
pub enum StageError {
    /// Intent classification failed; intent defaulted to `document`.
    #[error("Intent classification failed: {0}")]
    Classification(String),

    /// City extraction failed; the city was left empty.
    #[error("City extraction failed: {0}")]
    CityExtraction(String),

    /// The weather lookup failed; the snapshot was left empty.
    #[error("Weather fetch failed: {0}")]
    WeatherFetch(String),

    /// The document query failed; a fixed answer was substituted.
    #[error("Document query failed: {0}")]
    DocumentQuery(String),

    /// Final response generation failed; a fixed answer was substituted.
    #[error("Response generation failed: {0}")]
    ResponseGeneration(String),
}

/// The mutable record threaded through every stage of one run.
///
/// Created fresh per invocation and discarded once the result is
/// extracted; only derived fields are persisted. At most one of `weather`
/// and `document_answer` is populated, determined by `intent`.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    /// The raw input text.
    pub query: String,
    /// Prior turns, oldest first.
    pub chat_history: Vec<ChatMessage>,
    /// The classified intent; set by the first stage.
    pub intent: Option<Intent>,
    /// Extracted location, weather path only.
    pub city: String,
    /// Normalized weather record, weather path only.
    pub weather: Option<WeatherSnapshot>,
    /// Document answer with sources, document path only.
    pub document_answer: Option<DocumentAnswer>,
    /// Always non-empty by the end of the run.
    pub final_answer: String,
    /// Latest stage failure, if any. Presence does not halt the run.
    pub error: Option<String>,
}

impl PipelineState {
    /// Create the initial state for one run.
    pub fn new(query: impl Into<String>, chat_history: Vec<ChatMessage>) -> Self {
        Self { query: query.into(), chat_history, ..Self::default() }
    }

    /// Record a stage failure, overwriting any earlier one — only the
    /// latest is retained.
    pub fn record_error(&mut self, error: StageError) {
        self.error = Some(error.to_string());
    }
}

/// The outward-facing result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// The classified intent.
    pub intent: Intent,
    /// The final answer; non-empty even when stages failed.
    pub final_answer: String,
    /// The weather snapshot, when the weather path succeeded.
    pub weather: Option<WeatherSnapshot>,
    /// Supporting excerpts from the document path, rank order.
    pub sources: Vec<SourceExcerpt>,
    /// The latest stage failure, surfaced as a secondary warning.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_output_is_coerced_to_the_two_labels() {
        assert_eq!(Intent::classify_raw("weather"), Intent::Weather);
        assert_eq!(Intent::classify_raw("  Weather \n"), Intent::Weather);
        assert_eq!(Intent::classify_raw("WEATHER"), Intent::Weather);
        assert_eq!(Intent::classify_raw("document"), Intent::Document);
        assert_eq!(Intent::classify_raw("forecast"), Intent::Document);
        assert_eq!(Intent::classify_raw(""), Intent::Document);
        assert_eq!(Intent::classify_raw("I think this is weather-related"), Intent::Document);
    }

    #[test]
    fn routing_is_total_with_no_third_path() {
        assert_eq!(Stage::ClassifyIntent.next(Intent::Weather), Stage::ExtractCity);
        assert_eq!(Stage::ClassifyIntent.next(Intent::Document), Stage::QueryDocuments);

        // Unconditional edges ignore the intent.
        for intent in [Intent::Weather, Intent::Document] {
            assert_eq!(Stage::ExtractCity.next(intent), Stage::FetchWeather);
            assert_eq!(Stage::FetchWeather.next(intent), Stage::GenerateResponse);
            assert_eq!(Stage::QueryDocuments.next(intent), Stage::GenerateResponse);
            assert_eq!(Stage::GenerateResponse.next(intent), Stage::Done);
            assert_eq!(Stage::Done.next(intent), Stage::Done);
        }
    }

    #[test]
    fn every_path_reaches_done() {
        for intent in [Intent::Weather, Intent::Document] {
            let mut stage = Stage::ClassifyIntent;
            let mut hops = 0;
            while stage != Stage::Done {
                stage = stage.next(intent);
                hops += 1;
                assert!(hops < 10, "routing does not terminate for {intent}");
            }
        }
    }

    #[test]
    fn latest_error_wins() {
        let mut state = PipelineState::new("q", vec![]);
        state.record_error(StageError::CityExtraction("no city".into()));
        state.record_error(StageError::WeatherFetch("timeout".into()));
        assert_eq!(state.error.as_deref(), Some("Weather fetch failed: timeout"));
    }

    #[test]
    fn intent_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Intent::Weather).unwrap(), "weather");
        assert_eq!(Intent::Weather.to_string(), "weather");
    }
}
