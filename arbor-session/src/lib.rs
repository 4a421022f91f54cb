//! # arbor-session
//!
//! Conversation persistence: an append-only per-session log of
//! [`ConversationTurn`]s with ordered replay and aggregate listing.
//!
//! The [`ConversationStore`] trait is the contract the agent pipeline
//! writes through. Two implementations are provided:
//!
//! - [`InMemoryConversationStore`] — process-local, for development and
//!   tests
//! - `SqliteConversationStore` — durable storage over `sqlx`/SQLite,
//!   behind the `database` feature

mod memory;
#[cfg(feature = "database")]
mod sqlite;
mod store;

pub use memory::InMemoryConversationStore;
#[cfg(feature = "database")]
pub use sqlite::SqliteConversationStore;
pub use store::{
    ConversationStore, ConversationTurn, Result, SessionError, SessionSummary, new_session_id,
};
