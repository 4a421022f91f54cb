//! # arbor-model
//!
//! [`TextGenerator`](arbor_core::TextGenerator) implementations for Arbor.
//!
//! - [`OpenAiChatModel`] — the OpenAI chat-completions API, or any
//!   OpenAI-compatible endpoint via [`OpenAiChatModel::with_base_url`]
//! - [`MockModel`] — a deterministic model for tests: replays queued
//!   replies, then echoes the user message
//! - [`FailingModel`] — always errors; used to exercise degraded paths
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use arbor_model::OpenAiChatModel;
//!
//! let model = OpenAiChatModel::from_env()?.with_temperature(0.3);
//! let reply = model.complete("Say hello.").await?;
//! ```

pub mod mock;
pub mod openai;

pub use mock::{FailingModel, MockModel};
pub use openai::OpenAiChatModel;
