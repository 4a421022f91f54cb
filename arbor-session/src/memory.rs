//! Process-local conversation store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use arbor_core::ChatMessage;

use crate::store::{ConversationStore, ConversationTurn, Result, SessionSummary};

/// An in-memory [`ConversationStore`]: one flat append-ordered log behind
/// a `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    turns: RwLock<Vec<ConversationTurn>>,
}

impl InMemoryConversationStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, turn: ConversationTurn) -> Result<()> {
        debug!(session_id = %turn.session_id, intent = %turn.intent, "appending turn");
        self.turns.write().await.push(turn);
        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let turns = self.turns.read().await;
        let mut messages = Vec::new();
        for turn in turns.iter().filter(|t| t.session_id == session_id) {
            messages.push(ChatMessage::human(turn.query.clone()));
            messages.push(ChatMessage::ai(turn.answer.clone()));
        }
        Ok(messages)
    }

    async fn active_document(&self, session_id: &str) -> Result<Option<String>> {
        let turns = self.turns.read().await;
        Ok(turns
            .iter()
            .rev()
            .filter(|t| t.session_id == session_id)
            .find_map(|t| t.document_name.clone()))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let turns = self.turns.read().await;
        let mut summaries: Vec<SessionSummary> = Vec::new();

        for turn in turns.iter() {
            match summaries.iter_mut().find(|s| s.session_id == turn.session_id) {
                Some(summary) => {
                    summary.message_count += 1;
                    if turn.created_at > summary.last_message {
                        summary.last_message = turn.created_at;
                    }
                    if turn.document_name.is_some() {
                        summary.document_name = turn.document_name.clone();
                    }
                }
                None => summaries.push(SessionSummary {
                    session_id: turn.session_id.clone(),
                    message_count: 1,
                    last_message: turn.created_at,
                    document_name: turn.document_name.clone(),
                }),
            }
        }

        summaries.sort_by(|a, b| b.last_message.cmp(&a.last_message));
        Ok(summaries)
    }

    async fn clear_session(&self, session_id: &str) -> Result<()> {
        self.turns.write().await.retain(|t| t.session_id != session_id);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.turns.write().await.clear();
        Ok(())
    }
}
