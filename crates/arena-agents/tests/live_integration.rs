//! Integration tests against real model backends.
//!
//! These tests are `#[ignore]` by default. They require one of:
//! - The `claude` CLI installed and on PATH
//! - `OPENAI_API_KEY` set in the environment
//! - `ANTHROPIC_API_KEY` set in the environment
//!
//! Run explicitly with:
//! ```bash
//! cargo test -p arena-agents --test live_integration -- --ignored
//! ```

use std::sync::Arc;
use std::time::Duration;

use arena_agents::claude_cli::{check_cli_available, invoke_claude, ClaudeCliConfig};
use arena_agents::test_support::sample_snapshot;
use arena_agents::{create_backend, parse_decision_checked, DecisionMaker, SYSTEM_PROMPT};
use arena_models::config::{ProviderKind, SourceConfig};
use arena_models::decision::ModelSource;
use arena_models::report::DecisionOutcome;

async fn live_decision(source: SourceConfig) {
    let Some(var) = source.key_variable() else {
        return;
    };
    let Ok(key) = std::env::var(var) else {
        eprintln!("Skipping: {var} not set");
        return;
    };

    let backend = create_backend(&source, Some(key), Duration::from_secs(60))
        .expect("backend should build with a key");
    let maker = DecisionMaker::new(ModelSource::new(&source.name, &source.model), backend);

    let result = maker.evaluate(&sample_snapshot()).await;
    assert!(
        !matches!(result.outcome, DecisionOutcome::BackendFailed { .. }),
        "{} call failed: {:?}",
        source.name,
        result.outcome
    );
    assert!(
        !matches!(result.outcome, DecisionOutcome::Rejected { .. }),
        "{} reply was rejected: {:?}",
        source.name,
        result.outcome
    );
}

#[tokio::test]
#[ignore]
async fn cli_is_available() {
    assert!(check_cli_available().await, "claude CLI not found on PATH");
}

/// The CLI's output should parse as a decision without repairs.
#[tokio::test]
#[ignore]
async fn cli_reply_is_a_decision() {
    if !check_cli_available().await {
        eprintln!("Skipping: claude CLI not available");
        return;
    }

    let config = ClaudeCliConfig {
        timeout: Duration::from_secs(60),
        ..ClaudeCliConfig::default()
    };
    let prompt = arena_agents::build_prompt(&sample_snapshot());

    let raw = invoke_claude(SYSTEM_PROMPT, &prompt, &config)
        .await
        .expect("Claude CLI invocation failed");

    let parsed = parse_decision_checked(&raw).unwrap_or_else(|e| {
        panic!("CLI output is not a decision ({e}).\nRaw output:\n---\n{raw}\n---")
    });
    assert!(parsed.repairs.is_empty(), "repairs: {:?}", parsed.repairs);
}

#[tokio::test]
#[ignore]
async fn cli_reports_errors_for_invalid_model() {
    if !check_cli_available().await {
        eprintln!("Skipping: claude CLI not available");
        return;
    }

    let config = ClaudeCliConfig {
        model: "nonexistent-model-xyz".to_string(),
        timeout: Duration::from_secs(30),
    };
    let result = invoke_claude("Respond with OK", "test", &config).await;
    assert!(result.is_err(), "expected an error for an invalid model");
}

#[tokio::test]
#[ignore]
async fn openai_live_decision() {
    live_decision(SourceConfig::new("OpenAI", ProviderKind::OpenAi, "gpt-4")).await;
}

#[tokio::test]
#[ignore]
async fn anthropic_live_decision() {
    live_decision(SourceConfig::new(
        "Claude",
        ProviderKind::Anthropic,
        "claude-3-sonnet-20240229",
    ))
    .await;
}

#[tokio::test]
#[ignore]
async fn invalid_key_degrades_to_default() {
    let source = SourceConfig::new("OpenAI", ProviderKind::OpenAi, "gpt-4");
    let backend = create_backend(&source, Some("sk-invalid".to_string()), Duration::from_secs(30))
        .expect("backend should build");
    let maker = Arc::new(DecisionMaker::new(
        ModelSource::new("OpenAI", "gpt-4"),
        backend,
    ));

    let result = maker.evaluate(&sample_snapshot()).await;
    assert!(result.decision.is_default());
    assert!(matches!(result.outcome, DecisionOutcome::BackendFailed { .. }));
}
