//! The text-generation capability trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::ChatMessage;

/// A conversational text-generation model.
///
/// This is the only seam between Arbor and any remote LLM provider. The
/// agent pipeline drives every model-backed step through it with different
/// prompts, which keeps the routing and retrieval logic testable against
/// deterministic implementations.
///
/// # Example
///
/// ```rust,ignore
/// use arbor_core::TextGenerator;
///
/// let answer = model.chat(system_prompt, &history, "What does the PDF say?").await?;
/// ```
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply given a system instruction, prior history, and the
    /// current user message.
    ///
    /// An empty `system` string means no system instruction is sent.
    async fn chat(&self, system: &str, history: &[ChatMessage], user: &str) -> Result<String>;

    /// Single-turn completion for an instruction prompt.
    ///
    /// The default implementation is [`chat`](TextGenerator::chat) with no
    /// system instruction and no history.
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat("", &[], prompt).await
    }

    /// The model identifier, for logging.
    fn name(&self) -> &str;
}
