//! Running kernel information and version comparison.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Snapshot of the running kernel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelInfo {
    /// Build string from `/proc/sys/kernel/version`.
    pub version: String,
    /// Release string, e.g. `6.5.0-14-generic`.
    pub release: String,
    pub arch: String,
    pub headers_installed: bool,
    pub headers_path: Option<String>,
    pub secure_boot_enabled: bool,
}

/// Numeric `major.minor.patch` kernel version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KernelVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl KernelVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse the leading numeric part of a release string.
    ///
    /// Accepts `6.5.0-14-generic`, `5.15`, `6.8.9+rpt-rpi-v8`. Requires at
    /// least `major.minor`; a missing patch is treated as 0.
    pub fn parse(release: &str) -> Option<Self> {
        let numeric: &str = release
            .trim()
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()?;

        let mut parts = numeric.split('.').filter(|p| !p.is_empty());
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
