//! Chat message types.

use serde::{Deserialize, Serialize};

/// The author of a chat message.
///
/// Conversation history is role-alternating: each persisted turn expands to
/// one `Human` message followed by one `Ai` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A message written by the user.
    Human,
    /// A message produced by the agent.
    Ai,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a message authored by the user.
    pub fn human(content: impl Into<String>) -> Self {
        Self { role: Role::Human, content: content.into() }
    }

    /// Create a message authored by the agent.
    pub fn ai(content: impl Into<String>) -> Self {
        Self { role: Role::Ai, content: content.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let msg = ChatMessage::human("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "human");

        let msg = ChatMessage::ai("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "ai");
    }

    #[test]
    fn roles_round_trip() {
        let msg: ChatMessage = serde_json::from_str(r#"{"role":"ai","content":"x"}"#).unwrap();
        assert_eq!(msg.role, Role::Ai);
        assert_eq!(msg.content, "x");
    }
}
