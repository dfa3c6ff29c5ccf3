//! CLI entry point: read a configuration tree and a daily observation table,
//! run the engine, and emit the computed deck as JSON.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wbr_engine::config::RawConfig;
use wbr_engine::model::ObservationTable;

#[derive(Parser)]
#[command(name = "wbr-engine", about = "Weekly Business Review computation engine")]
struct Cli {
    /// Path to the configuration tree (JSON: setup/metrics/deck).
    #[arg(long)]
    config: PathBuf,

    /// Path to the daily observation table (JSON).
    #[arg(long)]
    observations: PathBuf,
}

fn init_tracing() {
    let settings = wbr_engine::config::Settings::load().unwrap_or_default();
    let filter = settings
        .log_filter
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let raw_config: RawConfig = serde_json::from_str(&std::fs::read_to_string(&cli.config)?)?;
    let observations: ObservationTable =
        serde_json::from_str(&std::fs::read_to_string(&cli.observations)?)?;

    let config = wbr_engine::lower(raw_config)?;
    tracing::info!(metrics = config.metrics.len(), deck_blocks = config.deck.len(), "configuration loaded");

    let output = wbr_engine::run(&config, &observations)?;
    tracing::info!(blocks = output.deck.blocks.len(), "deck assembled");

    serde_json::to_writer_pretty(std::io::stdout(), &output.deck)?;
    println!();
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "wbr-engine failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

