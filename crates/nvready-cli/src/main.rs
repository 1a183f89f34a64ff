//! CLI entry point.
//!
//! Loads `.env`, parses flags, composes the orchestrator via bootstrap and
//! dispatches to a handler. The process exit status is the handler's
//! verdict, or the error's exit code. Only setup failures before dispatch
//! surface as an `anyhow` error.

use anyhow::Context;
use clap::Parser;
use tracing::{debug, warn};

use nvready_cli::{Cli, CliError, bootstrap, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    bootstrap::init_tracing(cli.verbose)
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install the log subscriber")?;

    let code = match run(&cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: &Cli) -> Result<i32, CliError> {
    let ctx = bootstrap(cli)?;
    let detect = ctx.detect_context();

    // Ctrl-C cancels the run; detectors stop at their next check.
    let interrupt = detect.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling detection");
            interrupt.cancel();
        }
    });

    debug!(command = ?cli.command, json = cli.json, "Dispatching");
    handlers::dispatch(&ctx, &detect, cli.command, cli.json).await
}
