//! # arbor-agent
//!
//! The intent-routed conversational pipeline: a five-stage state machine
//! that classifies a query's intent, branches into a weather lookup or a
//! document query, and converges on a final response.
//!
//! ```text
//! classify_intent ──(weather)──► extract_city ──► fetch_weather ──┐
//!        │                                                        ▼
//!        └───────(document)────► query_documents ──────► generate_response
//! ```
//!
//! The branch is the only conditional edge and is a total function of the
//! classified [`Intent`] — classification coerces every raw model output
//! to one of the two labels, so the machine always reaches the terminal
//! stage.
//!
//! Every stage catches its own failures, records the cause into the
//! state's `error` field, and substitutes a safe default, so
//! [`Pipeline::run`] always terminates with a non-empty answer and never
//! raises past its boundary.

mod pipeline;
mod prompts;
mod state;

pub use pipeline::{
    GENERATION_FAILED_ANSWER, Pipeline, RETRIEVAL_FAILED_ANSWER, WEATHER_UNAVAILABLE_ANSWER,
};
pub use state::{Intent, PipelineResult, PipelineState, Stage, StageError};
