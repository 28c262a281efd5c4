//! Text completion capability
//!
//! The pipeline only needs "send a prompt, get text back". [`CompletionModel`]
//! is that seam; [`OpenAiClient`] implements it against any OpenAI-compatible
//! `/chat/completions` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Timeout for a single completion call
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the completion service
#[derive(Debug, Error)]
pub enum CompletionError {
    /// No API key configured
    #[error("Missing API key: set OPENAI_API_KEY")]
    MissingApiKey,

    /// Service did not answer in time
    #[error("Completion request timed out")]
    Timeout,

    /// Transport-level failure
    #[error("Completion request failed: {0}")]
    Request(String),

    /// Non-2xx response
    #[error("Completion API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Invalid completion response: {0}")]
    InvalidResponse(String),
}

impl CompletionError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout
        } else {
            CompletionError::Request(err.to_string())
        }
    }
}

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Parameters for one completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Single user prompt
    pub fn prompt(content: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            messages: vec![ChatMessage::user(content)],
            temperature,
            max_tokens,
        }
    }
}

/// A text completion service
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Generate text for the request
    ///
    /// Returns an empty string when the service answered without content.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

/// Connection settings for [`OpenAiClient`]
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Create a config with default endpoint and model
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: COMPLETION_TIMEOUT,
        }
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `LINKKIT_MODEL`
    pub fn from_env() -> Result<Self, CompletionError> {
        let api_key = env("OPENAI_API_KEY").ok_or(CompletionError::MissingApiKey)?;
        let mut config = Self::new(api_key);
        if let Some(base_url) = env("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(model) = env("LINKKIT_MODEL") {
            config.model = model;
        }
        Ok(config)
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completions client
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a client from config
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::Request(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self, CompletionError> {
        Self::new(OpenAiConfig::from_env()?)
    }

    /// Model used for requests
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatCompletionBody {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::InvalidResponse("no choices returned".to_string()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}
