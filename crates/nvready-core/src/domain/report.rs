//! Top-level detection report and install readiness verdict.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::driver::DriverStatus;
use super::gpu::GpuRecord;
use super::kernel::KernelInfo;
use super::nouveau::NouveauStatus;
use super::pci::PciDevice;
use super::validation::ValidationReport;

/// A non-fatal failure recorded by one detection branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchError {
    /// Branch that produced the error, e.g. `pci` or `kernel`.
    pub source: String,
    pub message: String,
}

impl BranchError {
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for BranchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

/// Everything a full detection run found.
///
/// Built by the orchestrator's branches while a run is in flight. An
/// interrupted run hands back whatever had been written by then.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    /// Every PCI function found, of any vendor and class.
    pub pci_devices: Vec<PciDevice>,
    pub gpus: Vec<GpuRecord>,
    pub driver: Option<DriverStatus>,
    pub nouveau: Option<NouveauStatus>,
    pub kernel: Option<KernelInfo>,
    pub validation: Option<ValidationReport>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub errors: Vec<BranchError>,
}

impl DetectionReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            pci_devices: Vec::new(),
            gpus: Vec::new(),
            driver: None,
            nouveau: None,
            kernel: None,
            validation: None,
            started_at,
            duration: Duration::ZERO,
            errors: Vec::new(),
        }
    }

    pub fn has_nvidia_gpus(&self) -> bool {
        !self.gpus.is_empty()
    }

    pub fn push_error(&mut self, source: impl Into<String>, message: impl ToString) {
        self.errors.push(BranchError::new(source, message.to_string()));
    }
}

/// Prefix that marks a non-blocking readiness reason.
pub const WARNING_PREFIX: &str = "Warning: ";

/// One line of the readiness explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Prevents installation.
    Blocking(String),
    /// Reported, but does not prevent installation.
    Warning(String),
}

impl Reason {
    pub fn blocking(message: impl Into<String>) -> Self {
        Self::Blocking(message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning(message.into())
    }

    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocking(message) => f.write_str(message),
            Self::Warning(message) => write!(f, "{WARNING_PREFIX}{message}"),
        }
    }
}

/// Install readiness verdict with its supporting reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub ready: bool,
    /// Rendered reasons; warnings carry the `"Warning: "` prefix.
    pub reasons: Vec<String>,
}

impl Readiness {
    /// Ready iff at least one GPU was found and every reason is a warning.
    pub fn evaluate(gpu_count: usize, reasons: &[Reason]) -> Self {
        Self {
            ready: gpu_count > 0 && reasons.iter().all(Reason::is_warning),
            reasons: reasons.iter().map(ToString::to_string).collect(),
        }
    }
}
