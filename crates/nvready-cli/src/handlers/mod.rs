//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, detect: &DetectContext, json: bool) -> Result<i32, CliError>`
//! - Call one orchestrator operation, render the result, return the exit status
//!
//! Handlers never touch detectors directly; everything goes through the
//! orchestrator built in bootstrap.

pub mod check;
pub mod driver;
pub mod gpus;
pub mod ready;
pub mod validate;

use nvready_core::DetectContext;

use crate::bootstrap::CliContext;
use crate::commands::Commands;
use crate::error::CliError;

/// Exit status for a successful run or a positive verdict.
pub const EXIT_OK: i32 = 0;

/// Exit status for a negative verdict (not ready, validation failed).
pub const EXIT_NEGATIVE: i32 = 1;

/// Route a subcommand to its handler.
pub async fn dispatch(
    ctx: &CliContext,
    detect: &DetectContext,
    command: Commands,
    json: bool,
) -> Result<i32, CliError> {
    match command {
        Commands::Check => check::execute(ctx, detect, json).await,
        Commands::Gpus => gpus::execute(ctx, detect, json).await,
        Commands::Driver => driver::execute(ctx, detect, json).await,
        Commands::Validate => validate::execute(ctx, detect, json).await,
        Commands::Ready => ready::execute(ctx, detect, json).await,
    }
}

/// Write rendered output to stdout.
pub(crate) fn emit(text: &str) {
    print!("{text}");
}
