use std::sync::Arc;
use std::time::Instant;

use arena_models::decision::Decision;
use arena_models::report::{DecisionOutcome, RoundReport, SourceDecision};
use arena_models::snapshot::PriceSnapshot;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::consensus::compare_sources;
use crate::decision_maker::DecisionMaker;

/// Runs every decision maker against one snapshot and compares the results.
pub struct Orchestrator {
    makers: Vec<Arc<DecisionMaker>>,
    concurrent: bool,
}

impl Orchestrator {
    pub fn new(makers: Vec<Arc<DecisionMaker>>) -> Self {
        Self {
            makers,
            concurrent: true,
        }
    }

    /// Query sources one after another instead of all at once.
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.makers.iter().map(|m| m.name())
    }

    pub fn len(&self) -> usize {
        self.makers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.makers.is_empty()
    }

    /// One decision round. Every source sees the same snapshot, and the
    /// comparison only starts once each source has answered or failed.
    pub async fn run(&self, snapshot: PriceSnapshot) -> RoundReport {
        let round_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        info!(
            %round_id,
            sources = self.makers.len(),
            concurrent = self.concurrent,
            "Starting round"
        );

        let snapshot = Arc::new(snapshot);
        let mut decisions = Vec::with_capacity(self.makers.len());

        if self.concurrent {
            let handles: Vec<_> = self
                .makers
                .iter()
                .map(|maker| spawn_evaluation(maker, &snapshot))
                .collect();
            for (maker, handle) in self.makers.iter().zip(handles) {
                decisions.push(collect(maker, handle, start).await);
            }
        } else {
            for maker in &self.makers {
                let task_start = Instant::now();
                let handle = spawn_evaluation(maker, &snapshot);
                decisions.push(collect(maker, handle, task_start).await);
            }
        }

        let comparison = compare_sources(&decisions);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(%round_id, verdict = ?comparison.verdict, elapsed_ms, "Round complete");

        RoundReport {
            round_id,
            started_at,
            snapshot: Arc::try_unwrap(snapshot).unwrap_or_else(|shared| (*shared).clone()),
            decisions,
            comparison,
            elapsed_ms,
        }
    }
}

fn spawn_evaluation(
    maker: &Arc<DecisionMaker>,
    snapshot: &Arc<PriceSnapshot>,
) -> JoinHandle<SourceDecision> {
    let maker = Arc::clone(maker);
    let snapshot = Arc::clone(snapshot);
    tokio::spawn(async move { maker.evaluate(&snapshot).await })
}

/// A panicked task still yields the default decision for its source.
async fn collect(
    maker: &DecisionMaker,
    handle: JoinHandle<SourceDecision>,
    started: Instant,
) -> SourceDecision {
    match handle.await {
        Ok(decision) => decision,
        Err(e) => {
            error!(source = %maker.name(), error = %e, "Decision task panicked");
            SourceDecision {
                source: maker.source().clone(),
                decision: Decision::default(),
                outcome: DecisionOutcome::BackendFailed {
                    error: e.to_string(),
                },
                elapsed_ms: started.elapsed().as_millis() as u64,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ModelBackend;
    use crate::test_support::{
        sample_snapshot, DelayedBackend, FailingBackend, PanickingBackend, ScriptedBackend,
        StallingBackend,
    };
    use arena_models::decision::{Action, ModelSource};
    use arena_models::report::Verdict;
    use std::time::Duration;

    fn maker(name: &str, backend: impl ModelBackend + 'static) -> Arc<DecisionMaker> {
        Arc::new(
            DecisionMaker::new(ModelSource::new(name, "mock"), Arc::new(backend))
                .with_call_timeout(Duration::from_millis(200)),
        )
    }

    #[tokio::test]
    async fn agreeing_sources() {
        let orchestrator = Orchestrator::new(vec![
            maker("OpenAI", ScriptedBackend::decision(Some("ETHUSDT"), "BUY", 0.9)),
            maker("Claude", ScriptedBackend::decision(Some("ETHUSDT"), "BUY", 0.4)),
        ]);

        let report = orchestrator.run(sample_snapshot()).await;
        assert_eq!(report.decisions.len(), 2);
        assert_eq!(report.comparison.verdict, Verdict::Agree);
        assert_eq!(report.snapshot.price("BTCUSDT"), 64000.0);
        assert!(report.elapsed_ms >= report.decisions[0].elapsed_ms);
    }

    #[tokio::test]
    async fn listing_keeps_configured_order() {
        let orchestrator = Orchestrator::new(vec![
            maker(
                "Slow",
                DelayedBackend::new(
                    Duration::from_millis(50),
                    r#"{"symbol":null,"action":"HOLD","confidence":0.1,"rationale":""}"#,
                ),
            ),
            maker("Fast", ScriptedBackend::decision(None, "HOLD", 0.2)),
        ]);

        let report = orchestrator.run(sample_snapshot()).await;
        let names: Vec<&str> = report
            .comparison
            .entries
            .iter()
            .map(|e| e.source.as_str())
            .collect();
        assert_eq!(names, vec!["Slow", "Fast"]);
        assert_eq!(report.comparison.verdict, Verdict::Agree);
    }

    #[tokio::test]
    async fn failing_source_does_not_block_the_other() {
        let orchestrator = Orchestrator::new(vec![
            maker("OpenAI", StallingBackend),
            maker("Claude", ScriptedBackend::decision(Some("BTCUSDT"), "SELL", 0.6)),
        ]);

        let report = orchestrator.run(sample_snapshot()).await;
        assert_eq!(report.decisions.len(), 2);
        assert!(matches!(
            report.decisions[0].outcome,
            DecisionOutcome::BackendFailed { .. }
        ));
        assert_eq!(report.decisions[1].decision.action, Action::Sell);
        // Default HOLD/None versus SELL/BTCUSDT
        assert_eq!(report.comparison.verdict, Verdict::Disagree);
    }

    #[tokio::test]
    async fn sequential_round_matches_concurrent() {
        let build = || {
            vec![
                maker("OpenAI", ScriptedBackend::decision(Some("SOLUSDT"), "BUY", 0.7)),
                maker("Claude", FailingBackend::new("rate limited")),
            ]
        };
        let concurrent = Orchestrator::new(build()).run(sample_snapshot()).await;
        let sequential = Orchestrator::new(build())
            .with_concurrency(false)
            .run(sample_snapshot())
            .await;

        let decisions = |r: &RoundReport| -> Vec<_> {
            r.decisions.iter().map(|d| d.decision.clone()).collect()
        };
        assert_eq!(decisions(&concurrent), decisions(&sequential));
        assert_eq!(concurrent.comparison, sequential.comparison);
    }

    #[tokio::test]
    async fn panicked_source_holds_by_default() {
        let orchestrator = Orchestrator::new(vec![
            maker("OpenAI", PanickingBackend),
            maker("Claude", ScriptedBackend::decision(Some("BTCUSDT"), "BUY", 0.7)),
        ]);

        let report = orchestrator.run(sample_snapshot()).await;
        assert_eq!(report.decisions.len(), 2);
        let panicked = &report.decisions[0];
        assert_eq!(panicked.source, ModelSource::new("OpenAI", "mock"));
        assert!(panicked.decision.is_default());
        assert!(matches!(
            panicked.outcome,
            DecisionOutcome::BackendFailed { .. }
        ));
        assert_eq!(report.decisions[1].decision.action, Action::Buy);
        assert_eq!(report.comparison.verdict, Verdict::Disagree);
    }

    #[tokio::test]
    async fn panicked_source_agrees_with_a_holding_source() {
        for concurrent in [true, false] {
            let orchestrator = Orchestrator::new(vec![
                maker("OpenAI", ScriptedBackend::decision(None, "HOLD", 0.4)),
                maker("Claude", PanickingBackend),
            ])
            .with_concurrency(concurrent);

            let report = orchestrator.run(sample_snapshot()).await;
            let names: Vec<&str> = report
                .decisions
                .iter()
                .map(|d| d.source.name.as_str())
                .collect();
            assert_eq!(names, vec!["OpenAI", "Claude"]);
            assert_eq!(report.comparison.verdict, Verdict::Agree, "concurrent = {concurrent}");
        }
    }

    #[test]
    fn reports_sources() {
        let orchestrator = Orchestrator::new(vec![
            maker("OpenAI", ScriptedBackend::new("{}")),
            maker("Claude", ScriptedBackend::new("{}")),
        ]);
        assert_eq!(orchestrator.len(), 2);
        assert_eq!(orchestrator.sources().collect::<Vec<_>>(), vec!["OpenAI", "Claude"]);
    }
}
