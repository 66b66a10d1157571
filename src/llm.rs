//! OpenAI-compatible chat completion client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use research_harness_core::prompt::SYSTEM_PROMPT;
use research_harness_core::ProviderError;

use crate::config::LlmConfig;
use crate::http;
use crate::traits::TextGenerator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

/// Chat completions against `{base_url}/chat/completions`.
///
/// Every request carries the research-assistant system prompt followed by
/// the caller's prompt as the single user message.
pub struct OpenAiChat {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: String,
    max_retries: u32,
    backoff: Duration,
}

impl OpenAiChat {
    /// Build a client from configuration and `OPENAI_API_KEY`.
    pub fn from_env(config: &LlmConfig) -> Result<Self, ProviderError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::Config("OPENAI_API_KEY not set".to_string()))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: api_key.into(),
            max_retries: config.max_retries,
            backoff: http::DEFAULT_BACKOFF,
        })
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else {
            format!("{}/chat/completions", base)
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        let messages = [Message::new("system", SYSTEM_PROMPT), Message::new("user", prompt)];
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": max_tokens,
        });
        let endpoint = self.endpoint();

        let json = http::send_json_with_retry(
            || {
                self.client
                    .post(&endpoint)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .json(&body)
            },
            "OpenAI",
            self.max_retries,
            self.backoff,
        )
        .await?;

        parse_chat_response(&json)
    }
}

/// Extract `choices[0].message.content`. A null content is an empty answer.
pub fn parse_chat_response(json: &serde_json::Value) -> Result<String, ProviderError> {
    let message = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| ProviderError::Parse("chat response has no choices".to_string()))?;

    Ok(message
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string())
}
