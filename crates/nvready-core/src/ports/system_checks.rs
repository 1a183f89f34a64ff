//! Primitive probes used by the validation engine.

use super::DetectError;

/// Free disk space lookup.
#[cfg_attr(test, mockall::automock)]
pub trait DiskSpacePort: Send + Sync {
    /// Bytes available to unprivileged users on the filesystem holding `path`.
    fn available_bytes(&self, path: &str) -> Result<u64, DetectError>;
}

/// Build toolchain lookup.
#[cfg_attr(test, mockall::automock)]
pub trait ToolchainPort: Send + Sync {
    fn is_installed(&self, tool: &str) -> bool;
}
