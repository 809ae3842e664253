use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decision::{Action, Decision, FieldRepair, ModelSource};
use crate::snapshot::PriceSnapshot;

/// How a source's decision came to be.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// The response was a valid decision as given.
    Accepted,
    /// The response was kept with some fields replaced.
    Repaired { repairs: Vec<FieldRepair> },
    /// The response was discarded in favor of the default decision.
    Rejected { reason: String },
    /// The backend call itself failed; the default decision was used.
    BackendFailed { error: String },
}

impl DecisionOutcome {
    pub fn used_default(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::BackendFailed { .. })
    }
}

/// One source's contribution to a round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDecision {
    pub source: ModelSource,
    pub decision: Decision,
    pub outcome: DecisionOutcome,
    pub elapsed_ms: u64,
}

/// Binary consensus verdict. Only defined for exactly two sources.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Agree,
    Disagree,
    NotApplicable,
}

/// A per-source row of the comparison listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComparisonEntry {
    pub source: String,
    pub symbol: Option<String>,
    pub action: Action,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComparisonResult {
    pub entries: Vec<ComparisonEntry>,
    pub verdict: Verdict,
}

impl ComparisonResult {
    pub fn agrees(&self) -> Option<bool> {
        match self.verdict {
            Verdict::Agree => Some(true),
            Verdict::Disagree => Some(false),
            Verdict::NotApplicable => None,
        }
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(
                f,
                "   {}: {} {}",
                entry.source,
                entry.action,
                entry.symbol.as_deref().unwrap_or("None")
            )?;
        }
        match self.verdict {
            Verdict::Agree => write!(f, "   Both models agree"),
            Verdict::Disagree => write!(f, "   Models disagree"),
            Verdict::NotApplicable => write!(f, "   No verdict (needs exactly two sources)"),
        }
    }
}

/// Everything produced by one decision round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundReport {
    pub round_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub snapshot: PriceSnapshot,
    pub decisions: Vec<SourceDecision>,
    pub comparison: ComparisonResult,
    pub elapsed_ms: u64,
}
