//! Core domain types, capability ports and detection orchestration for
//! nvready, a read-only check of whether a Linux host is ready for a
//! proprietary NVIDIA driver install.
//!
//! The crate never touches the host directly. Detectors are injected
//! through the traits in [`ports`]; `nvready-runtime` provides the real ones.

#![deny(unsafe_code)]

pub mod context;
pub mod domain;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use context::DetectContext;
pub use domain::{
    BranchError, CheckName, CheckResult, DetectionReport, DriverKind, DriverStatus, GpuModel,
    GpuRecord, KernelInfo, KernelVersion, NouveauStatus, PciDevice, Readiness, Reason, Severity,
    SmiGpu, SmiSnapshot, ValidationReport,
};
pub use ports::{
    Capabilities, DetectError, DiskSpacePort, DriverUtilityPort, GpuDatabasePort, KernelPort,
    NameResolverPort, NouveauPort, PciScannerPort, SmiError, ToolchainPort, ValidatorPort,
};
pub use services::{Orchestrator, SystemValidator, ValidationPolicy};
pub use settings::{DEFAULT_TIMEOUT_SECS, Settings, SettingsError, validate_settings};

// Silence unused dev-dependency warnings for the integration-only crates
#[cfg(test)]
use serde_json as _;
