use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ensure_success, http_client, ChatSettings};
use crate::backend::ModelBackend;
use crate::error::AgentError;
use crate::prompts::SYSTEM_PROMPT;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "Anthropic";

#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f64,
    pub system: &'a str,
    pub messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessagesResponse {
    /// Text of the first text block, trimmed.
    pub fn into_text(self) -> Result<String, AgentError> {
        self.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AgentError::EmptyResponse(PROVIDER.to_string()))
    }
}

/// Anthropic Messages API backend.
pub struct AnthropicBackend {
    client: Client,
    base_url: String,
    api_key: String,
    settings: ChatSettings,
}

impl AnthropicBackend {
    pub fn new(
        api_key: String,
        settings: ChatSettings,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AgentError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            settings,
        })
    }

    pub fn request<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[async_trait]
impl ModelBackend for AnthropicBackend {
    async fn call(&self, prompt: &str) -> Result<String, AgentError> {
        let url = format!("{}/v1/messages", self.base_url);
        debug!(model = %self.settings.model, %url, "Calling Anthropic");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request(prompt))
            .send()
            .await?;

        let body: MessagesResponse = ensure_success(PROVIDER, response).await?.json().await?;
        body.into_text()
    }
}
