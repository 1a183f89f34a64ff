//! GPU model database capability.

use crate::domain::GpuModel;

/// Static lookup of GPU models by PCI device id.
///
/// Returns owned copies, so callers may mutate results freely. Must be safe
/// for any number of concurrent callers.
#[cfg_attr(test, mockall::automock)]
pub trait GpuDatabasePort: Send + Sync {
    fn lookup(&self, device_id: &str) -> Option<GpuModel>;
}
