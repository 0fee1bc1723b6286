//! Chat completion client
//!
//! [`ChatModel`] is the seam every AI feature goes through. Production uses
//! [`OpenAiChatModel`] against any endpoint implementing
//! `/chat/completions`; when no API key is configured the server runs with
//! [`UnconfiguredChatModel`] and AI endpoints fail cleanly.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

/// Default OpenAI API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Default HTTP timeout for completion requests
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Chat model errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("AI provider not configured")]
    NotConfigured,

    /// Transport failure (connect, timeout, TLS)
    #[error("AI request failed: {0}")]
    Request(String),

    /// Non-2xx status from the provider
    #[error("AI provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Body did not match the chat completion shape
    #[error("Malformed AI response: {0}")]
    Malformed(String),

    #[error("AI response contained no content")]
    EmptyResponse,
}

impl LlmError {
    /// Message safe to show API clients
    ///
    /// Provider bodies and transport details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            LlmError::Request(_) => "AI request failed".to_string(),
            LlmError::Status { status, .. } => format!("AI provider returned {}", status),
            LlmError::Malformed(_) => "AI response could not be understood".to_string(),
            LlmError::NotConfigured | LlmError::EmptyResponse => self.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// One completion round-trip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the provider for a JSON object reply (`response_format`)
    pub json_response: bool,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages, ..Default::default() }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn json_response(mut self) -> Self {
        self.json_response = true;
        self
    }
}

/// Language model capable of answering a chat history
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Return the assistant reply text for `request`
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError>;
}

/// Stand-in used when no API key is available
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredChatModel;

#[async_trait]
impl ChatModel for UnconfiguredChatModel {
    async fn complete(&self, _request: ChatRequest) -> Result<String, LlmError> {
        Err(LlmError::NotConfigured)
    }
}

/// Client for OpenAI-compatible `/chat/completions` endpoints
///
/// `reqwest::Client` is reference counted, so clones share one pool.
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiChatModel {
    pub fn new(
        api_base_url: &str,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(format!("lumora-server/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", api_base_url.trim_end_matches('/')),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        let payload = CompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        debug!(
            model = %self.model,
            messages = request.messages.len(),
            temperature = ?request.temperature,
            max_tokens = ?request.max_tokens,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(endpoint = %self.endpoint, error = %e, "Chat completion transport failure");
                LlmError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Chat completion rejected by provider");
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        extract_content(parsed)
    }
}

fn extract_content(response: CompletionResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(LlmError::EmptyResponse)
}

// Wire types

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
