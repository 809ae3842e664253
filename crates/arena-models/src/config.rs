use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::snapshot::{default_symbols, Symbol};

/// Top-level configuration for a decision round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArenaConfig {
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub round: RoundConfig,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            round: RoundConfig::default(),
            sources: default_sources(),
        }
    }
}

/// Which exchange supplies prices.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    #[default]
    Binance,
    Bitget,
    /// Prices taken from `MarketConfig::fixed_prices`, no network access.
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketConfig {
    #[serde(default)]
    pub exchange: ExchangeKind,
    /// Override for the exchange's REST endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Symbols to quote, in prompt order.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<Symbol>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub fixed_prices: BTreeMap<Symbol, f64>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            exchange: ExchangeKind::default(),
            base_url: None,
            symbols: default_symbols(),
            request_timeout_seconds: default_request_timeout(),
            fixed_prices: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundConfig {
    /// Query all sources at once instead of one after another.
    #[serde(default = "default_true")]
    pub concurrent: bool,
    /// Per-source budget for a single model call.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_seconds: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            concurrent: true,
            call_timeout_seconds: default_call_timeout(),
        }
    }
}

/// Which backend implementation serves a source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    /// The locally installed `claude` CLI. Needs no API key.
    ClaudeCli,
}

/// Configuration for one model source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Display name, also the key in the comparison listing.
    pub name: String,
    pub provider: ProviderKind,
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl SourceConfig {
    pub fn new(name: &str, provider: ProviderKind, model: &str) -> Self {
        Self {
            name: name.to_string(),
            provider,
            model: model.to_string(),
            api_key_env: None,
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            enabled: true,
        }
    }

    /// The configured key variable, or the provider's conventional one.
    pub fn key_variable(&self) -> Option<&str> {
        match (&self.api_key_env, self.provider) {
            (Some(var), _) => Some(var.as_str()),
            (None, ProviderKind::OpenAi) => Some("OPENAI_API_KEY"),
            (None, ProviderKind::Anthropic) => Some("ANTHROPIC_API_KEY"),
            (None, ProviderKind::ClaudeCli) => None,
        }
    }
}

fn default_sources() -> Vec<SourceConfig> {
    let mut openai = SourceConfig::new("OpenAI", ProviderKind::OpenAi, "gpt-4");
    openai.api_key_env = Some("OPENAI_API_KEY".to_string());
    let mut claude = SourceConfig::new("Claude", ProviderKind::Anthropic, "claude-3-sonnet-20240229");
    claude.api_key_env = Some("ANTHROPIC_API_KEY".to_string());
    vec![openai, claude]
}

fn default_request_timeout() -> u64 {
    10
}
fn default_call_timeout() -> u64 {
    60
}
fn default_max_tokens() -> u32 {
    500
}
fn default_temperature() -> f64 {
    0.7
}
fn default_true() -> bool {
    true
}
