//! Open-source driver (nouveau) state.

use serde::{Deserialize, Serialize};

/// Path the remediation text tells users to create.
pub const NOUVEAU_BLACKLIST_PATH: &str = "/etc/modprobe.d/blacklist-nouveau.conf";

/// Load and blacklist state of the nouveau kernel module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NouveauStatus {
    /// Module is present in the kernel's module list.
    pub loaded: bool,
    /// Module has users or is bound to at least one device.
    pub in_use: bool,
    /// PCI addresses currently bound to nouveau.
    pub bound_devices: Vec<String>,
    pub blacklist_exists: bool,
    /// modprobe.d files containing a `blacklist nouveau` directive.
    pub blacklist_files: Vec<String>,
}
