//! PCI scan capability.

use crate::context::DetectContext;
use crate::domain::{DISPLAY_CLASS_PREFIX, PciDevice, TARGET_VENDOR_ID};

use super::DetectError;

/// Enumerates PCI devices.
///
/// Only `scan_all` is required; the filtered scans default to filtering it.
/// Failures are NotFound, PermissionDenied or Io.
#[cfg_attr(test, mockall::automock)]
pub trait PciScannerPort: Send + Sync {
    fn scan_all(&self, ctx: &DetectContext) -> Result<Vec<PciDevice>, DetectError>;

    fn scan_vendor(
        &self,
        ctx: &DetectContext,
        vendor_id: &str,
    ) -> Result<Vec<PciDevice>, DetectError> {
        let devices = self.scan_all(ctx)?;
        Ok(devices.into_iter().filter(|d| d.is_vendor(vendor_id)).collect())
    }

    fn scan_class(
        &self,
        ctx: &DetectContext,
        class_prefix: &str,
    ) -> Result<Vec<PciDevice>, DetectError> {
        let devices = self.scan_all(ctx)?;
        Ok(devices
            .into_iter()
            .filter(|d| d.has_class_prefix(class_prefix))
            .collect())
    }

    /// Display controllers of the target vendor (vendor AND class).
    fn scan_target_vendor_gpus(&self, ctx: &DetectContext) -> Result<Vec<PciDevice>, DetectError> {
        let devices = self.scan_vendor(ctx, TARGET_VENDOR_ID)?;
        Ok(devices
            .into_iter()
            .filter(|d| d.has_class_prefix(DISPLAY_CLASS_PREFIX))
            .collect())
    }
}
