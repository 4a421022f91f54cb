//! Deterministic models for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use arbor_core::{ChatMessage, CoreError, Result, TextGenerator};

/// A recorded model invocation, for assertions on prompt shape.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The system instruction sent, empty if none.
    pub system: String,
    /// Number of history messages sent.
    pub history_len: usize,
    /// The user message sent.
    pub user: String,
}

/// A deterministic [`TextGenerator`] for tests.
///
/// Replays queued replies in order; once the queue is empty it echoes the
/// user message back, so prompts that embed the data under test (a city
/// name, a context block) surface in the reply without any canned text.
#[derive(Default)]
pub struct MockModel {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockModel {
    /// Create a mock that echoes every user message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that replays the given replies before echoing.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// All invocations recorded so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock lock poisoned").clone()
    }

    /// Number of invocations recorded so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock lock poisoned").len()
    }
}

#[async_trait]
impl TextGenerator for MockModel {
    async fn chat(&self, system: &str, history: &[ChatMessage], user: &str) -> Result<String> {
        self.calls.lock().expect("mock lock poisoned").push(RecordedCall {
            system: system.to_string(),
            history_len: history.len(),
            user: user.to_string(),
        });

        let queued = self.replies.lock().expect("mock lock poisoned").pop_front();
        Ok(queued.unwrap_or_else(|| user.to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A [`TextGenerator`] whose every call fails.
///
/// Used to verify that callers absorb model failures instead of propagating
/// them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingModel;

#[async_trait]
impl TextGenerator for FailingModel {
    async fn chat(&self, _system: &str, _history: &[ChatMessage], _user: &str) -> Result<String> {
        Err(CoreError::Model("mock model failure".into()))
    }

    fn name(&self) -> &str {
        "failing-mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_then_echoes() {
        let model = MockModel::with_replies(["weather"]);
        assert_eq!(model.complete("classify this").await.unwrap(), "weather");
        assert_eq!(model.complete("hello back").await.unwrap(), "hello back");
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn records_prompt_shape() {
        let model = MockModel::new();
        let history = vec![ChatMessage::human("q"), ChatMessage::ai("a")];
        model.chat("system text", &history, "question").await.unwrap();

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, "system text");
        assert_eq!(calls[0].history_len, 2);
        assert_eq!(calls[0].user, "question");
    }

    #[tokio::test]
    async fn failing_model_always_errors() {
        assert!(FailingModel.complete("anything").await.is_err());
    }
}
