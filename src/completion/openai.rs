//! OpenAI-compatible chat completion client
//!
//! Endpoint: POST {base_url}/chat/completions
//!
//! Works against any server that speaks the Chat Completions format
//! (OpenAI, Azure OpenAI, Ollama's /v1, vLLM).

use crate::completion::{CompletionService, ModelTier};
use crate::errors::{DialogueError, Result};
use crate::types::{Conversation, Message};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for the standard tier
pub const DEFAULT_STANDARD_MODEL: &str = "gpt-4";

/// Default model for the economy tier
pub const DEFAULT_ECONOMY_MODEL: &str = "gpt-3.5-turbo";

/// Default request timeout (2 minutes; long replies are slow)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat completion client with one model per tier
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    standard_model: String,
    economy_model: String,
}

impl OpenAiClient {
    /// Create client against the public API with default models
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(
            DEFAULT_BASE_URL,
            api_key,
            DEFAULT_STANDARD_MODEL,
            DEFAULT_ECONOMY_MODEL,
            DEFAULT_TIMEOUT,
        )
    }

    /// Create client with custom configuration
    pub fn with_config(
        base_url: &str,
        api_key: impl Into<String>,
        standard_model: &str,
        economy_model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DialogueError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            standard_model: standard_model.to_string(),
            economy_model: economy_model.to_string(),
        })
    }

    /// Model name used for a tier
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Standard => &self.standard_model,
            ModelTier::Economy => &self.economy_model,
        }
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request<'a>(
        &'a self,
        messages: &'a Conversation,
        tier: ModelTier,
        max_tokens: usize,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: self.model_for(tier),
            messages: messages.messages(),
            max_tokens,
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(
        &self,
        messages: &Conversation,
        tier: ModelTier,
        max_tokens: usize,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(messages, tier, max_tokens);

        tracing::debug!(
            model = request.model,
            tier = tier.as_str(),
            messages = messages.len(),
            max_tokens,
            "chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DialogueError::Completion(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = %status, body = %error_text, "chat completion rejected");
            return Err(DialogueError::Completion(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| DialogueError::Completion(format!("Failed to parse response: {}", e)))?;

        body.into_reply()
    }
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: usize,
}

/// Chat completion response body (only the fields we read)
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_reply(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DialogueError::Completion("Response contained no message content".to_string()))
    }
}
