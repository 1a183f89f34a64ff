//! Port definitions (capability traits) for the detectors the core drives.
//!
//! Ports define the interfaces that the orchestrator expects from the host.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - Every port is a synchronous, `Send + Sync` trait; the orchestrator runs
//!   calls on blocking worker threads
//! - Every call that may block takes a `&DetectContext` so it can observe
//!   the shared deadline at call boundaries
//! - Real implementations live in `nvready-runtime`

pub mod driver_utility;
pub mod gpu_database;
pub mod kernel;
pub mod name_resolver;
pub mod nouveau;
pub mod pci_scanner;
pub mod system_checks;
pub mod validator;

use std::io;
use std::sync::Arc;

use thiserror::Error;

pub use driver_utility::{DriverUtilityPort, SmiError};
pub use gpu_database::GpuDatabasePort;
pub use kernel::KernelPort;
pub use name_resolver::NameResolverPort;
pub use nouveau::NouveauPort;
pub use pci_scanner::PciScannerPort;
pub use system_checks::{DiskSpacePort, ToolchainPort};
pub use validator::ValidatorPort;

/// Errors surfaced by detectors and the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    /// The shared deadline passed or the caller cancelled.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// A file, device or tool does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Malformed input to a check.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A subprocess or utility failed.
    #[error("Execution failed: {0}")]
    Execution(String),

    /// A required capability was never wired in.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DetectError {
    /// Classify an I/O error by kind, prefixing `context` to the message.
    pub fn from_io(context: impl std::fmt::Display, err: &io::Error) -> Self {
        let message = format!("{context}: {err}");
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(message),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(message),
            _ => Self::Io(message),
        }
    }

    pub fn missing_capability(name: &str) -> Self {
        Self::Configuration(format!("no {name} capability configured"))
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Container for every capability the orchestrator may call.
///
/// Each slot is optional and independently substitutable, so tests can wire
/// fakes for exactly the detectors a scenario needs. Operations that require
/// a missing capability fail with [`DetectError::Configuration`]; the full
/// run simply skips the branch.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub pci: Option<Arc<dyn PciScannerPort>>,
    pub database: Option<Arc<dyn GpuDatabasePort>>,
    pub names: Option<Arc<dyn NameResolverPort>>,
    pub driver_utility: Option<Arc<dyn DriverUtilityPort>>,
    pub nouveau: Option<Arc<dyn NouveauPort>>,
    pub kernel: Option<Arc<dyn KernelPort>>,
    pub validator: Option<Arc<dyn ValidatorPort>>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pci(mut self, pci: Arc<dyn PciScannerPort>) -> Self {
        self.pci = Some(pci);
        self
    }

    #[must_use]
    pub fn with_database(mut self, database: Arc<dyn GpuDatabasePort>) -> Self {
        self.database = Some(database);
        self
    }

    #[must_use]
    pub fn with_names(mut self, names: Arc<dyn NameResolverPort>) -> Self {
        self.names = Some(names);
        self
    }

    #[must_use]
    pub fn with_driver_utility(mut self, utility: Arc<dyn DriverUtilityPort>) -> Self {
        self.driver_utility = Some(utility);
        self
    }

    #[must_use]
    pub fn with_nouveau(mut self, nouveau: Arc<dyn NouveauPort>) -> Self {
        self.nouveau = Some(nouveau);
        self
    }

    #[must_use]
    pub fn with_kernel(mut self, kernel: Arc<dyn KernelPort>) -> Self {
        self.kernel = Some(kernel);
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn ValidatorPort>) -> Self {
        self.validator = Some(validator);
        self
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("pci", &self.pci.is_some())
            .field("database", &self.database.is_some())
            .field("names", &self.names.is_some())
            .field("driver_utility", &self.driver_utility.is_some())
            .field("nouveau", &self.nouveau.is_some())
            .field("kernel", &self.kernel.is_some())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classifies_kinds() {
        let not_found = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            DetectError::from_io("/sys/bus/pci/devices", &not_found),
            DetectError::NotFound(msg) if msg.starts_with("/sys/bus/pci/devices")
        ));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            DetectError::from_io("x", &denied),
            DetectError::PermissionDenied(_)
        ));

        let other = io::Error::other("boom");
        assert!(matches!(DetectError::from_io("x", &other), DetectError::Io(_)));
    }

    #[test]
    fn test_empty_capabilities_debug() {
        let caps = Capabilities::new();
        assert!(caps.pci.is_none());
        assert!(format!("{caps:?}").contains("pci: false"));
    }
}
