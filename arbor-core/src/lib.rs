//! # arbor-core
//!
//! Shared types for the Arbor conversational agent: chat messages, the
//! [`TextGenerator`] capability trait that all model-backed stages go
//! through, and the crate-spanning [`CoreError`].
//!
//! Every external model call in Arbor (intent classification, city
//! extraction, grounded question-answering, weather phrasing) is a prompt
//! sent through a single [`TextGenerator`], so the pipeline and the
//! retrieval layer can be exercised with deterministic stand-ins.

mod error;
mod message;
mod model;

pub use error::{CoreError, Result};
pub use message::{ChatMessage, Role};
pub use model::TextGenerator;
