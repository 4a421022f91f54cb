//! Durable conversation store over SQLite.
//!
//! Only available with the `database` feature. The schema mirrors the
//! in-memory log: one row per turn, append-only, ordered by `created_at`.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use arbor_core::ChatMessage;

use crate::store::{ConversationStore, ConversationTurn, Result, SessionError, SessionSummary};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS chat_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    user_query TEXT NOT NULL,
    ai_response TEXT NOT NULL,
    intent TEXT,
    pdf_name TEXT,
    created_at TEXT NOT NULL
)";

/// A [`ConversationStore`] backed by a SQLite database file.
pub struct SqliteConversationStore {
    pool: SqlitePool,
}

impl SqliteConversationStore {
    /// Open (or create) a database at the given path.
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::Storage(e.to_string()))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// Open an in-process database, for tests.
    ///
    /// Pinned to a single connection: every connection to `sqlite::memory:`
    /// gets its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

fn encode_timestamp(ts: DateTime<Utc>) -> String {
    // Fixed-width so lexicographic TEXT ordering matches time ordering.
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SessionError::Storage(format!("invalid timestamp '{raw}': {e}")))
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn append(&self, turn: ConversationTurn) -> Result<()> {
        debug!(session_id = %turn.session_id, intent = %turn.intent, "appending turn");
        sqlx::query(
            "INSERT INTO chat_history
             (session_id, user_query, ai_response, intent, pdf_name, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&turn.session_id)
        .bind(&turn.query)
        .bind(&turn.answer)
        .bind(&turn.intent)
        .bind(&turn.document_name)
        .bind(encode_timestamp(turn.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT user_query, ai_response
             FROM chat_history
             WHERE session_id = ?
             ORDER BY created_at",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let mut messages = Vec::with_capacity(rows.len() * 2);
        for row in rows {
            messages.push(ChatMessage::human(row.try_get::<String, _>("user_query")?));
            messages.push(ChatMessage::ai(row.try_get::<String, _>("ai_response")?));
        }
        Ok(messages)
    }

    async fn active_document(&self, session_id: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            "SELECT pdf_name
             FROM chat_history
             WHERE session_id = ? AND pdf_name IS NOT NULL
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_get::<Option<String>, _>("pdf_name")?),
            None => Ok(None),
        }
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let rows = sqlx::query(
            "SELECT
                 session_id,
                 COUNT(*) as message_count,
                 MAX(created_at) as last_message,
                 (SELECT pdf_name FROM chat_history ch2
                  WHERE ch2.session_id = chat_history.session_id
                  AND ch2.pdf_name IS NOT NULL
                  ORDER BY ch2.created_at DESC LIMIT 1) as pdf_name
             FROM chat_history
             GROUP BY session_id
             ORDER BY last_message DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            sessions.push(SessionSummary {
                session_id: row.try_get::<String, _>("session_id")?,
                message_count: row.try_get::<i64, _>("message_count")? as usize,
                last_message: decode_timestamp(&row.try_get::<String, _>("last_message")?)?,
                document_name: row.try_get::<Option<String>, _>("pdf_name")?,
            });
        }
        Ok(sessions)
    }

    async fn clear_session(&self, session_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM chat_history WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM chat_history").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::Role;
    use chrono::TimeZone;

    fn turn_at(
        session: &str,
        query: &str,
        answer: &str,
        document: Option<&str>,
        minute: u32,
    ) -> ConversationTurn {
        ConversationTurn {
            session_id: session.to_string(),
            query: query.to_string(),
            answer: answer.to_string(),
            intent: "document".to_string(),
            document_name: document.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn round_trips_history_in_order() {
        let store = SqliteConversationStore::in_memory().await.unwrap();
        store.append(turn_at("s1", "q1", "a1", None, 0)).await.unwrap();
        store.append(turn_at("s1", "q2", "a2", None, 1)).await.unwrap();

        let history = store.history("s1").await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, Role::Human);
        assert_eq!(history[0].content, "q1");
        assert_eq!(history[3].content, "a2");
    }

    #[tokio::test]
    async fn tracks_active_document_and_listing() {
        let store = SqliteConversationStore::in_memory().await.unwrap();
        store.append(turn_at("s1", "q1", "a1", Some("first.pdf"), 0)).await.unwrap();
        store.append(turn_at("s1", "q2", "a2", Some("second.pdf"), 1)).await.unwrap();
        store.append(turn_at("s2", "q", "a", None, 5)).await.unwrap();

        assert_eq!(store.active_document("s1").await.unwrap(), Some("second.pdf".to_string()));

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, "s2");
        assert_eq!(sessions[1].session_id, "s1");
        assert_eq!(sessions[1].message_count, 2);
        assert_eq!(sessions[1].document_name, Some("second.pdf".to_string()));
    }

    #[tokio::test]
    async fn clears_are_scoped() {
        let store = SqliteConversationStore::in_memory().await.unwrap();
        store.append(turn_at("s1", "q", "a", None, 0)).await.unwrap();
        store.append(turn_at("s2", "q", "a", None, 1)).await.unwrap();

        store.clear_session("s1").await.unwrap();
        assert!(store.history("s1").await.unwrap().is_empty());
        assert_eq!(store.history("s2").await.unwrap().len(), 2);

        store.clear_all().await.unwrap();
        assert!(store.list_sessions().await.unwrap().is_empty());
    }
}
