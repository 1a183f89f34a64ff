//! PCI enumeration from sysfs.

use std::io;
use std::sync::Arc;

use nvready_core::ports::{DetectError, PciScannerPort};
use nvready_core::{DetectContext, PciDevice};
use tracing::debug;

use crate::fs::FileSystem;

pub const PCI_DEVICES_DIR: &str = "/sys/bus/pci/devices";

/// Reads `/sys/bus/pci/devices/*/{vendor,device,class}` and the `driver`
/// symlink of every function.
pub struct SysfsPciScanner {
    fs: Arc<dyn FileSystem>,
}

impl SysfsPciScanner {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    fn read_device(&self, address: &str) -> io::Result<PciDevice> {
        let dir = format!("{PCI_DEVICES_DIR}/{address}");
        let vendor = self.fs.read_to_string(&format!("{dir}/vendor"))?;
        let device = self.fs.read_to_string(&format!("{dir}/device"))?;
        let class = self.fs.read_to_string(&format!("{dir}/class"))?;

        // Unbound functions have no driver link
        let driver = self
            .fs
            .read_link(&format!("{dir}/driver"))
            .ok()
            .and_then(|target| target.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();

        Ok(PciDevice::new(address, &vendor, &device, &class, driver))
    }
}

impl PciScannerPort for SysfsPciScanner {
    fn scan_all(&self, ctx: &DetectContext) -> Result<Vec<PciDevice>, DetectError> {
        ctx.check()?;
        let addresses = self
            .fs
            .read_dir(PCI_DEVICES_DIR)
            .map_err(|e| DetectError::from_io(PCI_DEVICES_DIR, &e))?;

        let mut devices = Vec::with_capacity(addresses.len());
        for address in addresses {
            ctx.check()?;
            match self.read_device(&address) {
                Ok(device) => devices.push(device),
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    return Err(DetectError::from_io(format!("{PCI_DEVICES_DIR}/{address}"), &e));
                }
                Err(e) => debug!(address = %address, error = %e, "Skipping unreadable PCI function"),
            }
        }

        devices.sort_by(|a, b| a.address.cmp(&b.address));
        debug!(count = devices.len(), "PCI scan complete");
        Ok(devices)
    }
}
