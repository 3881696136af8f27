// src/main.rs
mod cli;
mod client;
mod commands;
mod config;
mod git;
mod prompts;
mod provider;
mod providers;
mod spinner;
mod types;
mod ui;
mod updater;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;
use commands::{cmd_commit, cmd_config_update, cmd_show_config};
use config::ConfigStore;

// =============================================================================
// LOGGING
// =============================================================================
/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

// =============================================================================
// DISPATCH
// =============================================================================
/// `Ok(false)` maps to a failing exit code without an extra error line.
async fn run(cli: Cli) -> Result<bool> {
    if cli.check_update {
        updater::check_for_updates().await;
        return Ok(true);
    }

    let store = ConfigStore::user_default()?;
    debug!(path = %store.path().display(), "config store");

    if cli.config {
        cmd_show_config(&store)?;
        return Ok(true);
    }
    if cli.config_update {
        // Cancelling the form is not a failure.
        cmd_config_update(&store)?;
        return Ok(true);
    }

    let outcome = cmd_commit(&store, cli.show).await?;
    debug!(?outcome, "commit flow finished");
    Ok(outcome.is_success())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
