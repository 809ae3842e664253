//! Alpha Arena - side-by-side trading decisions from two language models
//!
//! Collects live prices for a fixed set of symbols, asks each configured
//! model for a single JSON trading decision, normalizes the replies, and
//! reports whether the models agree.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use arena::models::config::ArenaConfig;
//! use arena::agents::{DecisionMaker, ModelBackend, Orchestrator};
//! use arena::market::{MarketData, PriceSource};
//! ```

pub use arena_agents as agents;
pub use arena_market as market;
pub use arena_models as models;

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use arena_agents::{create_backend, format_for_display, DecisionMaker, Orchestrator, PromptBuilder};
use arena_market::{format_prices_for_display, MarketData};
use arena_models::config::ArenaConfig;
use arena_models::decision::ModelSource;
use arena_models::report::{DecisionOutcome, RoundReport};
use arena_models::snapshot::PriceSnapshot;
use tracing::{info, warn};

/// Read an `ArenaConfig` from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ArenaConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse config: {}", path.display()))
}

pub fn build_market(config: &ArenaConfig) -> Result<MarketData> {
    MarketData::from_config(&config.market).context("Failed to build price source")
}

/// One decision maker per enabled source. A source whose backend cannot be
/// built (usually a missing API key) is logged and skipped.
pub fn build_decision_makers<F>(config: &ArenaConfig, key_lookup: F) -> Vec<Arc<DecisionMaker>>
where
    F: Fn(&str) -> Option<String>,
{
    let timeout = Duration::from_secs(config.round.call_timeout_seconds);

    config
        .sources
        .iter()
        .filter(|s| s.enabled)
        .filter_map(|source| {
            let api_key = source.key_variable().and_then(&key_lookup);
            match create_backend(source, api_key, timeout) {
                Ok(backend) => {
                    info!(source = %source.name, model = %source.model, "Model source ready");
                    let maker = DecisionMaker::new(
                        ModelSource::new(&source.name, &source.model),
                        backend,
                    )
                    .with_prompt_builder(PromptBuilder::new(config.market.symbols.clone()))
                    .with_call_timeout(timeout);
                    Some(Arc::new(maker))
                }
                Err(e) => {
                    warn!(source = %source.name, error = %e, "Skipping model source");
                    None
                }
            }
        })
        .collect()
}

/// Build an Orchestrator from configuration. Fails when no source is usable.
pub fn build_orchestrator<F>(config: &ArenaConfig, key_lookup: F) -> Result<Orchestrator>
where
    F: Fn(&str) -> Option<String>,
{
    let makers = build_decision_makers(config, key_lookup);
    if makers.is_empty() {
        bail!("No model source is available; check API key configuration");
    }
    Ok(Orchestrator::new(makers).with_concurrency(config.round.concurrent))
}

/// Prices for the round. Fails when the source is down or no symbol could
/// be priced.
pub async fn collect_snapshot(market: &MarketData) -> Result<PriceSnapshot> {
    if !market.is_available().await {
        bail!("Price source {} is unavailable", market.source_name());
    }

    let snapshot = market.current_prices().await;
    if !snapshot.has_any_price() {
        bail!("No valid prices from {}; check network access", market.source_name());
    }
    Ok(snapshot)
}

/// One round with prebuilt parts.
pub async fn run_round(market: &MarketData, orchestrator: &Orchestrator) -> Result<RoundReport> {
    let snapshot = collect_snapshot(market).await?;
    Ok(orchestrator.run(snapshot).await)
}

/// One round from configuration, with API keys read from the environment.
pub async fn run(config: &ArenaConfig) -> Result<RoundReport> {
    let market = build_market(config)?;
    let snapshot = collect_snapshot(&market).await?;
    let orchestrator = build_orchestrator(config, |var| std::env::var(var).ok())?;
    Ok(orchestrator.run(snapshot).await)
}

/// Human-readable report: run time, prices, each decision, and the
/// comparison when at least two sources answered.
pub fn render_report(report: &RoundReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Run time: {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "\nCurrent prices:");
    let _ = writeln!(out, "{}", format_prices_for_display(&report.snapshot));

    for entry in &report.decisions {
        let _ = writeln!(out, "\n{} decision:", entry.source);
        let _ = writeln!(out, "{}", format_for_display(&entry.decision));
        match &entry.outcome {
            DecisionOutcome::Rejected { reason } => {
                let _ = writeln!(out, "   Note: response rejected ({reason})");
            }
            DecisionOutcome::BackendFailed { error } => {
                let _ = writeln!(out, "   Note: model call failed ({error})");
            }
            DecisionOutcome::Accepted | DecisionOutcome::Repaired { .. } => {}
        }
    }

    if report.decisions.len() >= 2 {
        let _ = writeln!(out, "\nComparison:");
        let _ = writeln!(out, "{}", "-".repeat(30));
        let _ = writeln!(out, "{}", report.comparison);
    }

    out
}
