//! Installed driver status.

use serde::{Deserialize, Serialize};

/// Which kind of GPU driver currently owns the hardware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    /// The vendor's proprietary kernel driver.
    Proprietary,
    /// The open-source (nouveau) driver.
    OpenSource,
    #[default]
    None,
}

impl std::fmt::Display for DriverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Proprietary => "proprietary",
            Self::OpenSource => "open-source",
            Self::None => "none",
        };
        f.write_str(label)
    }
}

/// Driver status for the whole host. `installed` is true iff `kind` is not
/// [`DriverKind::None`]; use the constructors to keep that consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriverStatus {
    pub installed: bool,
    pub kind: DriverKind,
    pub version: String,
    /// Highest CUDA runtime version the driver supports.
    pub cuda_version: String,
}

impl DriverStatus {
    pub fn new(kind: DriverKind, version: impl Into<String>, cuda_version: impl Into<String>) -> Self {
        Self {
            installed: kind != DriverKind::None,
            kind,
            version: version.into(),
            cuda_version: cuda_version.into(),
        }
    }

    pub fn none() -> Self {
        Self::new(DriverKind::None, "", "")
    }

    pub fn proprietary(version: impl Into<String>, cuda_version: impl Into<String>) -> Self {
        Self::new(DriverKind::Proprietary, version, cuda_version)
    }

    pub fn open_source(version: impl Into<String>) -> Self {
        Self::new(DriverKind::OpenSource, version, "")
    }
}
