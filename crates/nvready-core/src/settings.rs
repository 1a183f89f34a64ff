//! Settings domain types and validation.
//!
//! This module contains the tunables of a readiness run. These are pure
//! domain types with no infrastructure dependencies; adapters fill them from
//! flags, environment or files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::KernelVersion;

/// Default deadline for a whole orchestrator call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Oldest kernel current proprietary driver branches build against.
pub const DEFAULT_MIN_KERNEL_VERSION: &str = "3.10";

/// Free space needed to unpack and build the driver.
pub const DEFAULT_REQUIRED_DISK_MB: u64 = 2048;

pub const DEFAULT_DISK_PATHS: [&str; 4] = ["/", "/usr", "/var", "/tmp"];

pub const DEFAULT_BUILD_TOOLS: [&str; 3] = ["gcc", "make", "ld"];

/// Readiness run settings.
///
/// All fields are optional to support partial configuration and graceful
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Deadline for one orchestrator call, in seconds.
    pub timeout_secs: Option<u64>,

    /// Minimum kernel release, as `major.minor[.patch]`.
    pub min_kernel_version: Option<String>,

    /// Free space required on every candidate mount point, in MB.
    pub required_disk_mb: Option<u64>,

    /// Mount points probed for free space.
    pub disk_paths: Option<Vec<String>>,

    /// Tools that must be on `PATH` to build the kernel module.
    pub required_build_tools: Option<Vec<String>>,

    /// Alternative root for sysfs/procfs/etc reads (testing and chroots).
    pub sysfs_root: Option<String>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            min_kernel_version: Some(DEFAULT_MIN_KERNEL_VERSION.to_string()),
            required_disk_mb: Some(DEFAULT_REQUIRED_DISK_MB),
            disk_paths: Some(DEFAULT_DISK_PATHS.iter().map(ToString::to_string).collect()),
            required_build_tools: Some(
                DEFAULT_BUILD_TOOLS.iter().map(ToString::to_string).collect(),
            ),
            sysfs_root: None,
        }
    }

    #[must_use]
    pub fn effective_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    #[must_use]
    pub fn effective_min_kernel_version(&self) -> &str {
        self.min_kernel_version
            .as_deref()
            .unwrap_or(DEFAULT_MIN_KERNEL_VERSION)
    }

    #[must_use]
    pub fn effective_required_disk_mb(&self) -> u64 {
        self.required_disk_mb.unwrap_or(DEFAULT_REQUIRED_DISK_MB)
    }

    #[must_use]
    pub fn effective_disk_paths(&self) -> Vec<String> {
        self.disk_paths.clone().unwrap_or_else(|| {
            DEFAULT_DISK_PATHS.iter().map(ToString::to_string).collect()
        })
    }

    #[must_use]
    pub fn effective_build_tools(&self) -> Vec<String> {
        self.required_build_tools.clone().unwrap_or_else(|| {
            DEFAULT_BUILD_TOOLS.iter().map(ToString::to_string).collect()
        })
    }

    /// Overlay the fields of `other` that are set.
    pub fn merge(&mut self, other: &Self) {
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.min_kernel_version.is_some() {
            self.min_kernel_version.clone_from(&other.min_kernel_version);
        }
        if other.required_disk_mb.is_some() {
            self.required_disk_mb = other.required_disk_mb;
        }
        if other.disk_paths.is_some() {
            self.disk_paths.clone_from(&other.disk_paths);
        }
        if other.required_build_tools.is_some() {
            self.required_build_tools.clone_from(&other.required_build_tools);
        }
        if other.sysfs_root.is_some() {
            self.sysfs_root.clone_from(&other.sysfs_root);
        }
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Timeout must be between 1 and 600 seconds, got {0}")]
    InvalidTimeout(u64),

    #[error("Minimum kernel version must look like MAJOR.MINOR, got '{0}'")]
    InvalidKernelVersion(String),

    #[error("Required disk space must be greater than 0 MB")]
    InvalidDiskSpace,

    #[error("At least one disk path must be configured")]
    NoDiskPaths,

    #[error("At least one build tool must be configured")]
    NoBuildTools,
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(timeout) = settings.timeout_secs {
        if !(1..=600).contains(&timeout) {
            return Err(SettingsError::InvalidTimeout(timeout));
        }
    }

    if let Some(ref version) = settings.min_kernel_version {
        if KernelVersion::parse(version).is_none() {
            return Err(SettingsError::InvalidKernelVersion(version.clone()));
        }
    }

    if settings.required_disk_mb == Some(0) {
        return Err(SettingsError::InvalidDiskSpace);
    }

    if settings.disk_paths.as_ref().is_some_and(Vec::is_empty) {
        return Err(SettingsError::NoDiskPaths);
    }

    if settings.required_build_tools.as_ref().is_some_and(Vec::is_empty) {
        return Err(SettingsError::NoBuildTools);
    }

    Ok(())
}
