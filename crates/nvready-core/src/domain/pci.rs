//! PCI device records as reported by the hardware scan.

use serde::{Deserialize, Serialize};

/// PCI vendor id of the GPU vendor this tool prepares installs for.
pub const TARGET_VENDOR_ID: &str = "10de";

/// Display name of the target vendor, used in synthesized GPU names.
pub const TARGET_VENDOR_NAME: &str = "NVIDIA";

/// PCI base class prefix for display controllers (VGA, 3D, other).
pub const DISPLAY_CLASS_PREFIX: &str = "03";

/// Kernel driver name of the proprietary driver.
pub const PROPRIETARY_DRIVER: &str = "nvidia";

/// Kernel driver name of the open-source driver.
pub const OPEN_SOURCE_DRIVER: &str = "nouveau";

/// A single PCI function as enumerated from the bus.
///
/// Identifiers are stored as lowercase hex without a `0x` prefix, e.g.
/// vendor `10de`, device `2684`, class `030000`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PciDevice {
    /// Bus address, e.g. `0000:01:00.0`.
    pub address: String,
    pub vendor_id: String,
    pub device_id: String,
    /// Class code, e.g. `030000` for a VGA controller.
    pub class: String,
    /// Name of the currently bound kernel driver; empty if unbound.
    pub driver: String,
}

impl PciDevice {
    /// Create a device record, normalizing the hex identifiers.
    pub fn new(
        address: impl Into<String>,
        vendor_id: &str,
        device_id: &str,
        class: &str,
        driver: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            vendor_id: normalize_hex_id(vendor_id),
            device_id: normalize_hex_id(device_id),
            class: normalize_hex_id(class),
            driver: driver.into(),
        }
    }

    pub fn is_vendor(&self, vendor_id: &str) -> bool {
        self.vendor_id.eq_ignore_ascii_case(&normalize_hex_id(vendor_id))
    }

    pub fn has_class_prefix(&self, prefix: &str) -> bool {
        self.class.starts_with(&normalize_hex_id(prefix))
    }

    pub fn is_display_controller(&self) -> bool {
        self.has_class_prefix(DISPLAY_CLASS_PREFIX)
    }

    /// True only when the device is BOTH from the target vendor and a
    /// display controller. Audio functions on the same card do not count.
    pub fn is_target_gpu(&self) -> bool {
        self.is_vendor(TARGET_VENDOR_ID) && self.is_display_controller()
    }

    pub fn has_driver(&self) -> bool {
        !self.driver.is_empty()
    }

    pub fn is_bound_to(&self, driver: &str) -> bool {
        self.driver == driver
    }
}

/// Normalize a hex identifier: trim, drop any `0x` prefix, lowercase.
pub fn normalize_hex_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    stripped.to_ascii_lowercase()
}
