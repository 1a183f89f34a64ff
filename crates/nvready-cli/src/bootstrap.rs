//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter: settings from flags/env, the real detectors from
//! nvready-runtime, and the orchestrator from nvready-core.

use nvready_core::{DetectContext, Orchestrator, Settings, validate_settings};
use nvready_runtime::system_capabilities;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::parser::Cli;

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub orchestrator: Orchestrator,
    pub settings: Settings,
}

impl CliContext {
    /// A fresh detection context carrying the configured deadline.
    pub fn detect_context(&self) -> DetectContext {
        DetectContext::with_timeout(self.settings.effective_timeout())
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default
/// level (`warn`, or `debug` with `--verbose`).
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}

/// Overlay flag/env values on the defaults.
pub fn settings_from_cli(cli: &Cli) -> Settings {
    let mut settings = Settings::with_defaults();
    settings.merge(&Settings {
        timeout_secs: cli.timeout_secs,
        min_kernel_version: cli.min_kernel_version.clone(),
        required_disk_mb: cli.required_disk_mb,
        disk_paths: cli.disk_paths.clone(),
        required_build_tools: cli.build_tools.clone(),
        sysfs_root: cli.sysfs_root.clone(),
    });
    settings
}

/// Validate settings and wire the real detectors.
pub fn bootstrap(cli: &Cli) -> Result<CliContext, CliError> {
    let settings = settings_from_cli(cli);
    validate_settings(&settings)?;
    debug!(?settings, "Settings resolved");

    let orchestrator = Orchestrator::new(system_capabilities(&settings));
    Ok(CliContext {
        orchestrator,
        settings,
    })
}
