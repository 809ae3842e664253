use std::sync::Arc;
use std::time::{Duration, Instant};

use arena_models::decision::{Decision, ModelSource};
use arena_models::report::{DecisionOutcome, SourceDecision};
use arena_models::snapshot::PriceSnapshot;
use tracing::{debug, info, warn};

use crate::backend::ModelBackend;
use crate::error::AgentError;
use crate::parser::parse_decision_checked;
use crate::prompts::PromptBuilder;

/// Turns a price snapshot into a decision for one model source.
///
/// Holds no state between calls. Backend errors, timeouts, and unusable
/// responses all end in the default decision; nothing propagates out.
pub struct DecisionMaker {
    source: ModelSource,
    backend: Arc<dyn ModelBackend>,
    prompts: PromptBuilder,
    call_timeout: Option<Duration>,
}

impl DecisionMaker {
    pub fn new(source: ModelSource, backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            source,
            backend,
            prompts: PromptBuilder::default(),
            call_timeout: None,
        }
    }

    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub async fn get_decision(&self, snapshot: &PriceSnapshot) -> Decision {
        self.evaluate(snapshot).await.decision
    }

    /// Like `get_decision`, keeping how the decision was reached.
    pub async fn evaluate(&self, snapshot: &PriceSnapshot) -> SourceDecision {
        let start = Instant::now();
        let prompt = self.prompts.build(snapshot);
        debug!(source = %self.source.name, model = %self.source.model, "Requesting decision");

        let (decision, outcome) = match self.call(&prompt).await {
            Ok(raw) => match parse_decision_checked(&raw) {
                Ok(parsed) if parsed.repairs.is_empty() => {
                    (parsed.decision, DecisionOutcome::Accepted)
                }
                Ok(parsed) => {
                    for repair in &parsed.repairs {
                        warn!(source = %self.source.name, %repair, "Repaired decision field");
                    }
                    (
                        parsed.decision,
                        DecisionOutcome::Repaired {
                            repairs: parsed.repairs,
                        },
                    )
                }
                Err(e) => {
                    warn!(
                        source = %self.source.name,
                        error = %e,
                        length = raw.len(),
                        "Rejected model response"
                    );
                    debug!(source = %self.source.name, raw = %raw, "Rejected response text");
                    (
                        Decision::default(),
                        DecisionOutcome::Rejected {
                            reason: e.to_string(),
                        },
                    )
                }
            },
            Err(e) => {
                warn!(source = %self.source.name, error = %e, "Model call failed");
                (
                    Decision::default(),
                    DecisionOutcome::BackendFailed {
                        error: e.to_string(),
                    },
                )
            }
        };

        let elapsed = start.elapsed();
        info!(
            source = %self.source.name,
            action = %decision.action,
            symbol = decision.symbol.as_deref().unwrap_or("None"),
            confidence = decision.confidence,
            elapsed_ms = elapsed.as_millis(),
            "Decision ready"
        );

        SourceDecision {
            source: self.source.clone(),
            decision,
            outcome,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    async fn call(&self, prompt: &str) -> Result<String, AgentError> {
        match self.call_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.backend.call(prompt))
                .await
                .map_err(|_| AgentError::Timeout(timeout))?,
            None => self.backend.call(prompt).await,
        }
    }

    pub fn format_for_display(&self, decision: &Decision) -> String {
        format_for_display(decision)
    }
}

/// Three indented lines: action and symbol, confidence, rationale.
pub fn format_for_display(decision: &Decision) -> String {
    format!(
        "   Decision: {} {}\n   Confidence: {:.2}\n   Rationale: {}",
        decision.action,
        decision.symbol.as_deref().unwrap_or("None"),
        decision.confidence,
        decision.rationale
    )
}
