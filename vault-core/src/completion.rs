//! Remote completion adapter — forwards a raw query to an external
//! chat-completion API and returns the first candidate's text.
//!
//! One request per analysis, bearer-token authenticated, explicit 30s
//! timeout, no retries. Failures are typed; `complete_or_none` recovers
//! them to "no result" for callers on the composition path.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed system instruction sent with every request.
const SYSTEM_INSTRUCTION: &str =
    "You are a cross-subject study assistant for Math, Science, History, and Literature. \
     Answer the student's question with a concise explanation first, then supporting detail.";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// How many characters of the completion become the summary field.
pub const SUMMARY_CHARS: usize = 200;

/// Completion adapter errors
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing API key — set COMPLETION_API_KEY in the environment")]
    MissingApiKey,

    #[error("Response contained no completion candidates")]
    MissingCompletion,
}

/// Completion client configuration
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl CompletionConfig {
    /// Build from explicit settings; the API key falls back to the
    /// `COMPLETION_API_KEY` environment variable when not given.
    pub fn new(
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
        temperature: f32,
        top_p: f32,
    ) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var("COMPLETION_API_KEY").ok())
            .unwrap_or_default();

        Self {
            api_key,
            model,
            max_tokens,
            temperature,
            top_p,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Chat-completion client.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
    config: CompletionConfig,
    base_url: String,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        Self::with_base_url(config, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(
        config: CompletionConfig,
        base_url: String,
    ) -> Result<Self, CompletionError> {
        if config.api_key.is_empty() {
            return Err(CompletionError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send one completion request and return the first candidate's text.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .unwrap_or(error_body);

            tracing::error!(code = status.as_u16(), message = %message, "Completion API error");

            return Err(CompletionError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(CompletionError::MissingCompletion)
    }

    /// Like `complete`, but recovers every failure to `None` after logging
    /// it — the composition path treats a failed call as "no result".
    pub async fn complete_or_none(&self, prompt: &str) -> Option<String> {
        match self.complete(prompt).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "Completion failed — composing without remote result");
                None
            }
        }
    }
}

/// Split a completion into (summary, deep dive): the first
/// `SUMMARY_CHARS` characters, and the full text. A fixed-width split
/// with no sentence-boundary awareness.
pub fn split_completion(text: &str) -> (String, String) {
    let summary: String = text.chars().take(SUMMARY_CHARS).collect();
    (summary, text.to_string())
}
