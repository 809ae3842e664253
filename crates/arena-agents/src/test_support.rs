//! Backend doubles for exercising decision makers and rounds without a
//! real model vendor.

use std::sync::Mutex;
use std::time::Duration;

use arena_models::snapshot::PriceSnapshot;
use async_trait::async_trait;

use crate::backend::ModelBackend;
use crate::error::AgentError;

/// Holding decision returned by `RecordingBackend`.
pub const HOLD_REPLY: &str =
    r#"{"symbol": null, "action": "HOLD", "confidence": 0.5, "rationale": "no clear edge"}"#;

/// Prices for the five default symbols.
pub fn sample_snapshot() -> PriceSnapshot {
    PriceSnapshot::new([
        ("BTCUSDT", 64000.0),
        ("ETHUSDT", 3100.5),
        ("XRPUSDT", 0.5234),
        ("BNBUSDT", 580.12),
        ("SOLUSDT", 145.8765),
    ])
}

/// Always answers with the same text.
pub struct ScriptedBackend {
    reply: String,
}

impl ScriptedBackend {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
        }
    }

    /// Reply with a well-formed decision.
    pub fn decision(symbol: Option<&str>, action: &str, confidence: f64) -> Self {
        let reply = serde_json::json!({
            "symbol": symbol,
            "action": action,
            "confidence": confidence,
            "rationale": format!("scripted {action}"),
        });
        Self {
            reply: reply.to_string(),
        }
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn call(&self, _prompt: &str) -> Result<String, AgentError> {
        Ok(self.reply.clone())
    }
}

/// Always fails as if the vendor returned a server error.
pub struct FailingBackend {
    message: String,
}

impl FailingBackend {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl ModelBackend for FailingBackend {
    async fn call(&self, _prompt: &str) -> Result<String, AgentError> {
        Err(AgentError::Api {
            provider: "mock".to_string(),
            status: 503,
            body: self.message.clone(),
        })
    }
}

/// Never returns.
pub struct StallingBackend;

#[async_trait]
impl ModelBackend for StallingBackend {
    async fn call(&self, _prompt: &str) -> Result<String, AgentError> {
        std::future::pending().await
    }
}

/// Sleeps before answering.
pub struct DelayedBackend {
    delay: Duration,
    reply: String,
}

impl DelayedBackend {
    pub fn new(delay: Duration, reply: &str) -> Self {
        Self {
            delay,
            reply: reply.to_string(),
        }
    }
}

#[async_trait]
impl ModelBackend for DelayedBackend {
    async fn call(&self, _prompt: &str) -> Result<String, AgentError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}

/// Panics inside the call.
pub struct PanickingBackend;

#[async_trait]
impl ModelBackend for PanickingBackend {
    async fn call(&self, _prompt: &str) -> Result<String, AgentError> {
        panic!("backend panicked");
    }
}

/// Records every prompt it receives and answers with `HOLD_REPLY`.
#[derive(Default)]
pub struct RecordingBackend {
    prompts: Mutex<Vec<String>>,
}

impl RecordingBackend {
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().ok().and_then(|p| p.last().cloned())
    }
}

#[async_trait]
impl ModelBackend for RecordingBackend {
    async fn call(&self, prompt: &str) -> Result<String, AgentError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        Ok(HOLD_REPLY.to_string())
    }
}
