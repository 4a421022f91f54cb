//! The pipeline: stage functions, error absorption, and the public entry.

use std::sync::Arc;

use tracing::{error, info, warn};

use arbor_core::{ChatMessage, TextGenerator};
use arbor_rag::{DocumentAnswer, DocumentIndex};
use arbor_session::{ConversationStore, ConversationTurn};
use arbor_weather::WeatherProvider;

use crate::prompts;
use crate::state::{Intent, PipelineResult, PipelineState, Stage, StageError};

/// Fixed answer when the weather branch produced no snapshot.
pub const WEATHER_UNAVAILABLE_ANSWER: &str =
    "I couldn't fetch the weather data. Please try again.";

/// Fixed answer substituted when the document query stage fails.
pub const RETRIEVAL_FAILED_ANSWER: &str = "Failed to retrieve information from documents.";

/// Fixed answer substituted when final response generation fails.
pub const GENERATION_FAILED_ANSWER: &str = "An error occurred while generating the response.";

/// The intent-routed conversational pipeline.
///
/// Owns the stage graph and error propagation across stages. All external
/// calls go through the capability seams ([`TextGenerator`],
/// [`WeatherProvider`], [`DocumentIndex`], [`ConversationStore`]), so the
/// whole machine runs against deterministic stand-ins in tests.
pub struct Pipeline {
    generator: Arc<dyn TextGenerator>,
    weather: Arc<dyn WeatherProvider>,
    index: Arc<DocumentIndex>,
    store: Arc<dyn ConversationStore>,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        weather: Arc<dyn WeatherProvider>,
        index: Arc<DocumentIndex>,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self { generator, weather, index, store }
    }

    /// The document index this pipeline queries.
    pub fn index(&self) -> &Arc<DocumentIndex> {
        &self.index
    }

    /// Run one query end-to-end.
    ///
    /// Drives the state machine from `classify_intent` to the terminal
    /// stage, appends one [`ConversationTurn`], and returns the result.
    /// Always returns; every internal failure is absorbed into the
    /// result's `error` alongside a degraded but non-empty `final_answer`.
    pub async fn run(
        &self,
        query: &str,
        session_id: &str,
        history: Vec<ChatMessage>,
    ) -> PipelineResult {
        info!(session_id, query, "pipeline run started");

        let mut state = PipelineState::new(query, history);
        let mut stage = Stage::ClassifyIntent;

        while stage != Stage::Done {
            state = match stage {
                Stage::ClassifyIntent => self.classify_intent(state).await,
                Stage::ExtractCity => self.extract_city(state).await,
                Stage::FetchWeather => self.fetch_weather(state).await,
                Stage::QueryDocuments => self.query_documents(state).await,
                Stage::GenerateResponse => self.generate_response(state).await,
                Stage::Done => state,
            };
            stage = stage.next(state.intent.unwrap_or_default());
        }

        let intent = state.intent.unwrap_or_default();
        let document_name = match intent {
            Intent::Document => self.index.current_document().await,
            Intent::Weather => None,
        };

        let turn = ConversationTurn::new(
            session_id,
            query,
            state.final_answer.clone(),
            intent.as_str(),
            document_name,
        );
        if let Err(e) = self.store.append(turn).await {
            error!(session_id, error = %e, "failed to persist turn");
            state.error = Some(format!("Failed to persist turn: {e}"));
        }

        info!(session_id, %intent, degraded = state.error.is_some(), "pipeline run finished");

        PipelineResult {
            intent,
            final_answer: state.final_answer,
            weather: state.weather,
            sources: state.document_answer.map(|a| a.sources).unwrap_or_default(),
            error: state.error,
        }
    }

    /// Classify the query as `weather` or `document`.
    ///
    /// Failures record an error and default to `Document` so the machine
    /// always reaches a terminal state.
    async fn classify_intent(&self, mut state: PipelineState) -> PipelineState {
        match self.generator.complete(&prompts::classify_intent(&state.query)).await {
            Ok(raw) => {
                let intent = Intent::classify_raw(&raw);
                info!(%intent, "intent classified");
                state.intent = Some(intent);
            }
            Err(e) => {
                warn!(error = %e, "intent classification failed, defaulting to document");
                state.record_error(StageError::Classification(e.to_string()));
                state.intent = Some(Intent::Document);
            }
        }
        state
    }

    /// Extract the city from a weather query.
    ///
    /// On failure the city stays empty and the downstream fetch fails on
    /// its own; the branch is not short-circuited.
    async fn extract_city(&self, mut state: PipelineState) -> PipelineState {
        match self.generator.complete(&prompts::extract_city(&state.query)).await {
            Ok(city) => {
                state.city = city.trim().to_string();
                info!(city = %state.city, "city extracted");
            }
            Err(e) => {
                state.record_error(StageError::CityExtraction(e.to_string()));
                state.city = String::new();
            }
        }
        state
    }

    /// Fetch the current weather for the extracted city.
    async fn fetch_weather(&self, mut state: PipelineState) -> PipelineState {
        match self.weather.fetch(&state.city).await {
            Ok(snapshot) => {
                info!(city = %snapshot.city, "weather fetched");
                state.weather = Some(snapshot);
            }
            Err(e) => {
                warn!(city = %state.city, error = %e, "weather fetch failed");
                state.record_error(StageError::WeatherFetch(e.to_string()));
                state.weather = None;
            }
        }
        state
    }

    /// Query the document index with the conversation history.
    async fn query_documents(&self, mut state: PipelineState) -> PipelineState {
        match self.index.query(&state.query, &state.chat_history).await {
            Ok(answer) => {
                info!(source_count = answer.sources.len(), "documents queried");
                state.document_answer = Some(answer);
            }
            Err(e) => {
                warn!(error = %e, "document query failed");
                state.record_error(StageError::DocumentQuery(e.to_string()));
                state.document_answer = Some(DocumentAnswer {
                    answer: RETRIEVAL_FAILED_ANSWER.to_string(),
                    sources: vec![],
                });
            }
        }
        state
    }

    /// Produce the final answer; terminal stage for both branches.
    ///
    /// The document path forwards the already-grounded answer without a
    /// further model call. The weather path phrases the snapshot
    /// conversationally, or emits the fixed apology when no snapshot was
    /// obtained.
    async fn generate_response(&self, mut state: PipelineState) -> PipelineState {
        let intent = state.intent.unwrap_or_default();

        match intent {
            Intent::Weather => match &state.weather {
                Some(snapshot) => {
                    let prompt = prompts::weather_reply(&state.query, snapshot);
                    match self.generator.complete(&prompt).await {
                        Ok(answer) => state.final_answer = answer,
                        Err(e) => {
                            state.record_error(StageError::ResponseGeneration(e.to_string()));
                            state.final_answer = GENERATION_FAILED_ANSWER.to_string();
                        }
                    }
                }
                None => state.final_answer = WEATHER_UNAVAILABLE_ANSWER.to_string(),
            },
            Intent::Document => {
                state.final_answer = state
                    .document_answer
                    .as_ref()
                    .map(|a| a.answer.clone())
                    .unwrap_or_else(|| "No answer available.".to_string());
            }
        }

        state
    }
}
