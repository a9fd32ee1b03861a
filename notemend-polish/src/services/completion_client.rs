//! Chat-completion API client
//!
//! Thin client for an OpenAI-compatible chat-completion endpoint. Performs
//! exactly one outbound call per invocation; tier fallback lives in the
//! polisher, keeping the two concerns separately testable.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Sampling temperature, pinned low to keep output consistent between runs
const COMPLETION_TEMPERATURE: f32 = 0.2;

/// Completion client errors
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Connection or transport-level failure (includes timeouts)
    #[error("Network error: {0}")]
    Network(String),

    /// Completion service returned a non-success status
    #[error("Completion API error {status}: {body}")]
    Transport { status: u16, body: String },

    /// Response body was not a valid completion payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// Service responded but produced no usable output text
    #[error("Completion response contained no usable output")]
    EmptyOutput,
}

/// Chat message in the completion request/response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: ChatMessage,
}

/// Normalized result of one completion attempt
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResult {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

/// Chat-completion API client
pub struct CompletionClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CompletionClient {
    /// Create a new client with a bounded per-attempt timeout.
    pub fn new(
        base_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Request one completion from the given model.
    ///
    /// The whole instruction prompt (which embeds the note) travels as a
    /// single system message. No internal retries.
    pub async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
    ) -> Result<CompletionResult, CompletionError> {
        let request = ChatCompletionRequest {
            model: model_id.to_string(),
            messages: vec![ChatMessage {
                role: "system".to_string(),
                content: prompt.to_string(),
            }],
            temperature: COMPLETION_TEMPERATURE,
        };

        let url = format!("{}{}", self.base_url, COMPLETIONS_PATH);

        tracing::debug!(model = model_id, url = %url, "Requesting completion");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Network(format!("Request timed out: {}", e))
                } else {
                    CompletionError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        let result: CompletionResult = response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        tracing::debug!(
            model = model_id,
            choices = result.choices.len(),
            "Completion received"
        );

        Ok(result)
    }
}
