//! Main CLI parser and top-level argument handling.
//!
//! Every tunable falls back to an `NVREADY_*` environment variable, which
//! may itself come from a `.env` file.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the NVIDIA driver install-readiness check.
#[derive(Parser, Debug)]
#[command(name = "nvready")]
#[command(about = "Check whether this host is ready for an NVIDIA driver install")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Deadline for the whole run, in seconds
    #[arg(long = "timeout-secs", env = "NVREADY_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Oldest supported kernel release (MAJOR.MINOR)
    #[arg(long = "min-kernel", env = "NVREADY_MIN_KERNEL_VERSION", global = true)]
    pub min_kernel_version: Option<String>,

    /// Free space required on each checked path, in MB
    #[arg(long = "required-disk-mb", env = "NVREADY_REQUIRED_DISK_MB", global = true)]
    pub required_disk_mb: Option<u64>,

    /// Mount points probed for free space (comma separated)
    #[arg(
        long = "disk-paths",
        env = "NVREADY_DISK_PATHS",
        value_delimiter = ',',
        global = true
    )]
    pub disk_paths: Option<Vec<String>>,

    /// Tools that must be on PATH (comma separated)
    #[arg(
        long = "build-tools",
        env = "NVREADY_BUILD_TOOLS",
        value_delimiter = ',',
        global = true
    )]
    pub build_tools: Option<Vec<String>>,

    /// Read sysfs, procfs and /etc from this directory instead of /
    #[arg(long = "sysfs-root", env = "NVREADY_SYSFS_ROOT", global = true)]
    pub sysfs_root: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
