//! OpenAI chat-completions client.
//!
//! Minimal client for the `/v1/chat/completions` endpoint: one user message
//! in, the first choice's message content out.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::ModelProvider;
use crate::config::AiConfig;
use crate::error::{AiError, AiResult};

/// OpenAI API client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: AiConfig,
    client: Client,
    base_url: String,
}

/// Chat completion request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// One chat message.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completion response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

/// One response choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Message inside a response choice.
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Token usage metadata.
#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl OpenAiClient {
    /// Create a new OpenAI client.
    pub fn new(config: AiConfig) -> AiResult<Self> {
        if config.api_key.is_empty() {
            return Err(AiError::AuthenticationError);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(AiError::Http)?;

        let base_url = "https://api.openai.com/v1".to_string();

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    /// Build the request body for one prompt.
    fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Pull the answer text out of a parsed response.
    fn extract_answer(response: ChatResponse) -> AiResult<String> {
        if let Some(usage) = &response.usage {
            info!(
                "OpenAI API usage - Prompt: {:?} tokens, Response: {:?} tokens, Total: {:?} tokens",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::InvalidResponse("no choices in response".to_string()))?;

        choice
            .message
            .content
            .ok_or_else(|| AiError::InvalidResponse("empty message content".to_string()))
    }
}

#[async_trait]
impl ModelProvider for OpenAiClient {
    async fn complete(&self, prompt: &str) -> AiResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_body = self.build_request(prompt);

        debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("OpenAI API error: {} - {}", status, body);
            return Err(AiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        Self::extract_answer(parsed)
    }
}
