use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use smc_compose::{load_replay_script, run_replay};
use smc_compose_core::load_compose_config;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "compose_replay_harness",
    about = "Replays a scripted compose session against the workflow controller"
)]
struct CliArgs {
    #[arg(
        long,
        env = "SMC_COMPOSE_CONFIG",
        default_value = ".smc/compose.json",
        help = "Compose configuration file. Defaults apply when the file does not exist."
    )]
    config: PathBuf,

    #[arg(
        long,
        env = "SMC_COMPOSE_SCRIPT",
        help = "Replay script with scripted bus replies, confirmations and triggers."
    )]
    script: PathBuf,

    #[arg(
        long = "summary-json-out",
        env = "SMC_COMPOSE_SUMMARY_JSON_OUT",
        help = "Optional path for the replay summary. The summary is always printed to stdout."
    )]
    summary_json_out: Option<PathBuf>,
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn write_json<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(payload).context("failed to encode summary")?;
    fs::write(path, format!("{body}\n"))
        .with_context(|| format!("failed to write {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let config = load_compose_config(&args.config)?;
    let script = load_replay_script(&args.script)?;
    let summary = run_replay(script, config).await;
    tracing::info!(
        events = summary.events_handled,
        signals = summary.signals.len(),
        requests = summary.requests.len(),
        "compose replay finished"
    );

    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("failed to encode summary")?
    );
    if let Some(path) = args.summary_json_out.as_deref() {
        write_json(path, &summary)?;
    }
    Ok(())
}
