use std::path::PathBuf;

use anyhow::{Context, Result};
use arena_models::config::ArenaConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "arena", about = "Compare trading decisions from two language models")]
struct Cli {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the round report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Pretty-print the output JSON
    #[arg(long, requires = "json")]
    pretty: bool,

    /// Query model sources one after another
    #[arg(long)]
    sequential: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // API keys may live in a .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => arena::load_config(path)?,
        None => ArenaConfig::default(),
    };
    if cli.sequential {
        config.round.concurrent = false;
    }

    let report = arena::run(&config).await.context("Round failed")?;

    if cli.json {
        let output = if cli.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        println!("{output}");
    } else {
        println!("Alpha Arena");
        println!("{}", "=".repeat(50));
        print!("{}", arena::render_report(&report));
    }

    Ok(())
}
