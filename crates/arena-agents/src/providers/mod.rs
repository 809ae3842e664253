pub mod anthropic;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use arena_models::config::{ProviderKind, SourceConfig};
use reqwest::{Client, Response};
use tracing::warn;

use crate::backend::ModelBackend;
use crate::claude_cli::{ClaudeCliBackend, ClaudeCliConfig};
use crate::error::AgentError;

pub use anthropic::AnthropicBackend;
pub use openai::OpenAiBackend;

/// Sampling settings shared by the HTTP vendors.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl From<&SourceConfig> for ChatSettings {
    fn from(source: &SourceConfig) -> Self {
        Self {
            model: source.model.clone(),
            max_tokens: source.max_tokens,
            temperature: source.temperature,
        }
    }
}

/// Create the backend a source is configured for.
///
/// `api_key` is the resolved value of the source's key variable; HTTP
/// vendors fail with `MissingApiKey` without one.
pub fn create_backend(
    source: &SourceConfig,
    api_key: Option<String>,
    timeout: Duration,
) -> Result<Arc<dyn ModelBackend>, AgentError> {
    let require_key = || -> Result<String, AgentError> {
        api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AgentError::MissingApiKey(source.key_variable().unwrap_or_default().to_string())
            })
    };

    match source.provider {
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiBackend::new(
            require_key()?,
            ChatSettings::from(source),
            source.base_url.clone(),
            timeout,
        )?)),
        ProviderKind::Anthropic => Ok(Arc::new(AnthropicBackend::new(
            require_key()?,
            ChatSettings::from(source),
            source.base_url.clone(),
            timeout,
        )?)),
        ProviderKind::ClaudeCli => Ok(Arc::new(ClaudeCliBackend::new(ClaudeCliConfig {
            model: source.model.clone(),
            timeout,
        }))),
    }
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client, AgentError> {
    Ok(Client::builder()
        .user_agent(concat!("alpha-arena/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}

/// Pass through a 2xx response; turn anything else into `AgentError::Api`.
pub(crate) async fn ensure_success(
    provider: &str,
    response: Response,
) -> Result<Response, AgentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(provider, status = status.as_u16(), "Model API request failed");
    Err(AgentError::Api {
        provider: provider.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_vendors_need_a_key() {
        let source = SourceConfig::new("OpenAI", ProviderKind::OpenAi, "gpt-4");
        let result = create_backend(&source, None, Duration::from_secs(5));
        match result {
            Err(AgentError::MissingApiKey(var)) => assert_eq!(var, "OPENAI_API_KEY"),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected MissingApiKey"),
        }

        let source = SourceConfig::new("Claude", ProviderKind::Anthropic, "claude-3-haiku");
        let blank = create_backend(&source, Some("  ".to_string()), Duration::from_secs(5));
        assert!(matches!(blank, Err(AgentError::MissingApiKey(_))));
    }

    #[test]
    fn creates_backends_with_keys() {
        for provider in [ProviderKind::OpenAi, ProviderKind::Anthropic] {
            let source = SourceConfig::new("Model", provider, "some-model");
            let backend = create_backend(&source, Some("sk-test".to_string()), Duration::from_secs(5));
            assert!(backend.is_ok(), "{provider:?}");
        }
    }

    #[test]
    fn claude_cli_needs_no_key() {
        let source = SourceConfig::new("Local", ProviderKind::ClaudeCli, "claude-3-5-haiku-latest");
        assert!(create_backend(&source, None, Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn chat_settings_from_source() {
        let mut source = SourceConfig::new("OpenAI", ProviderKind::OpenAi, "gpt-4");
        source.temperature = 0.1;
        let settings = ChatSettings::from(&source);
        assert_eq!(settings.model, "gpt-4");
        assert_eq!(settings.max_tokens, 500);
        assert_eq!(settings.temperature, 0.1);
    }
}
