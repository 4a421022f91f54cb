//! The conversation store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use arbor_core::ChatMessage;

/// Errors that can occur in conversation persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A storage backend failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A database failure.
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A convenience result type for store operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// One persisted conversational turn: a query and its answer, tagged with
/// the classified intent and the document in use, if any.
///
/// Turns are append-only and ordered by `created_at`; they are never
/// mutated, and deleted only by the explicit clear operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Opaque session identifier.
    pub session_id: String,
    /// The user's query text.
    pub query: String,
    /// The agent's answer text.
    pub answer: String,
    /// The classified intent label (`weather` or `document`).
    pub intent: String,
    /// The document active for this turn, if the document path was taken.
    pub document_name: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a turn stamped with the current time.
    pub fn new(
        session_id: impl Into<String>,
        query: impl Into<String>,
        answer: impl Into<String>,
        intent: impl Into<String>,
        document_name: Option<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            query: query.into(),
            answer: answer.into(),
            intent: intent.into(),
            document_name,
            created_at: Utc::now(),
        }
    }
}

/// Aggregate view of one session, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Opaque session identifier.
    pub session_id: String,
    /// Number of persisted turns.
    pub message_count: usize,
    /// Timestamp of the most recent turn.
    pub last_message: DateTime<Utc>,
    /// Most recent non-null document name, if any.
    pub document_name: Option<String>,
}

/// Append-only per-session conversation log.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append one turn.
    async fn append(&self, turn: ConversationTurn) -> Result<()>;

    /// Replay a session's turns as role-alternating messages, oldest
    /// first: each turn expands to a human message followed by an ai
    /// message.
    async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>>;

    /// The most recent non-null document name for a session.
    async fn active_document(&self, session_id: &str) -> Result<Option<String>>;

    /// Summaries of all sessions, most recently active first.
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>>;

    /// Delete all turns for one session.
    async fn clear_session(&self, session_id: &str) -> Result<()>;

    /// Delete all turns for all sessions.
    async fn clear_all(&self) -> Result<()>;
}

/// Generate a fresh opaque session id.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
