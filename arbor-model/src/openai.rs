//! OpenAI chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use arbor_core::{ChatMessage, CoreError, Result, Role, TextGenerator};

/// The default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// The default chat model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// The default sampling temperature.
const DEFAULT_TEMPERATURE: f32 = 0.3;

/// A [`TextGenerator`] backed by the OpenAI chat-completions API.
///
/// Uses `reqwest` to call `{base_url}/chat/completions` directly. Any
/// OpenAI-compatible server (Ollama, vLLM, a gateway) works via
/// [`with_base_url`](OpenAiChatModel::with_base_url).
///
/// # Configuration
///
/// - `model` – defaults to `gpt-4o-mini`.
/// - `temperature` – defaults to 0.3.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment
///   variable.
pub struct OpenAiChatModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiChatModel {
    /// Create a new client with the given API key and model name.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(CoreError::Config("API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENAI_BASE_URL.into(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Create a client using the `OPENAI_API_KEY` environment variable and
    /// the default model.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            CoreError::Config("OPENAI_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key, DEFAULT_MODEL)
    }

    /// Point the client at an OpenAI-compatible base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::Human => "user",
        Role::Ai => "assistant",
    }
}

// ── TextGenerator implementation ───────────────────────────────────

#[async_trait]
impl TextGenerator for OpenAiChatModel {
    async fn chat(&self, system: &str, history: &[ChatMessage], user: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if !system.is_empty() {
            messages.push(WireMessage { role: "system", content: system });
        }
        for msg in history {
            messages.push(WireMessage { role: wire_role(msg.role), content: &msg.content });
        }
        messages.push(WireMessage { role: "user", content: user });

        debug!(model = %self.model, message_count = messages.len(), "chat completion request");

        let request_body =
            ChatRequest { model: &self.model, messages, temperature: self.temperature };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "request failed");
                CoreError::Model(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(model = %self.model, %status, "API error");
            return Err(CoreError::Model(format!("API returned {status}: {detail}")));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(model = %self.model, error = %e, "failed to parse response");
            CoreError::Model(format!("failed to parse response: {e}"))
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CoreError::Model("API returned no completion".into()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
