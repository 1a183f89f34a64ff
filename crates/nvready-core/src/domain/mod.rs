//! Domain model for GPU install-readiness diagnostics.
//!
//! Pure value types with no I/O. Detectors produce them, the orchestrator
//! merges them and callers receive them as immutable snapshots.

mod driver;
mod gpu;
mod kernel;
mod nouveau;
mod pci;
mod report;
mod validation;

pub use driver::{DriverKind, DriverStatus};
pub use gpu::{GpuModel, GpuRecord, SmiGpu, SmiSnapshot, UNKNOWN_ARCHITECTURE};
pub use kernel::{KernelInfo, KernelVersion};
pub use nouveau::{NOUVEAU_BLACKLIST_PATH, NouveauStatus};
pub use pci::{
    DISPLAY_CLASS_PREFIX, OPEN_SOURCE_DRIVER, PROPRIETARY_DRIVER, PciDevice, TARGET_VENDOR_ID,
    TARGET_VENDOR_NAME, normalize_hex_id,
};
pub use report::{BranchError, DetectionReport, Readiness, Reason, WARNING_PREFIX};
pub use validation::{CheckName, CheckResult, Severity, ValidationReport};
