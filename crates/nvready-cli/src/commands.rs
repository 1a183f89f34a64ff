//! Available subcommands.

use clap::Subcommand;

/// One subcommand per orchestrator operation.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run every detector and print the full report
    Check,

    /// List NVIDIA GPUs with database and runtime details
    Gpus,

    /// Show the installed driver
    Driver,

    /// Run the install-readiness checks
    Validate,

    /// Decide whether a driver install can proceed
    Ready,
}
