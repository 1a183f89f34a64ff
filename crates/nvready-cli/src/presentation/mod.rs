//! Output rendering for CLI commands.
//!
//! Text rendering returns `String`s so handlers decide where they go; JSON
//! output is the serde form of the same core types.

mod text;

use serde::Serialize;

use crate::error::CliError;

pub use text::{
    render_driver, render_gpus, render_kernel, render_nouveau, render_readiness, render_report,
    render_validation,
};

// ANSI color codes
pub(crate) const GREEN: &str = "\x1b[32m";
pub(crate) const RED: &str = "\x1b[31m";
pub(crate) const YELLOW: &str = "\x1b[33m";
pub(crate) const BOLD: &str = "\x1b[1m";
pub(crate) const RESET: &str = "\x1b[0m";

/// Pretty JSON for `--json`.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}
