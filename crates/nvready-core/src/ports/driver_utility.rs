//! Driver utility (nvidia-smi) capability.

use thiserror::Error;

use crate::context::DetectContext;
use crate::domain::SmiSnapshot;

use super::DetectError;

/// Classified failures of the driver utility.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmiError {
    /// The utility binary is not installed.
    #[error("nvidia-smi not found")]
    NotFound,

    /// The utility exists but cannot talk to the kernel driver.
    #[error("NVIDIA driver is not loaded")]
    DriverNotLoaded,

    #[error("no NVIDIA devices found")]
    NoDevices,

    #[error("nvidia-smi failed: {0}")]
    Execution(String),

    /// The shared deadline passed before the call started.
    #[error("cancelled: {0}")]
    Cancelled(String),
}

impl From<DetectError> for SmiError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::Cancelled(msg) => Self::Cancelled(msg),
            DetectError::NotFound(_) => Self::NotFound,
            other => Self::Execution(other.to_string()),
        }
    }
}

impl From<SmiError> for DetectError {
    fn from(err: SmiError) -> Self {
        match err {
            SmiError::NotFound => Self::NotFound(err.to_string()),
            SmiError::Cancelled(msg) => Self::Cancelled(msg),
            SmiError::DriverNotLoaded | SmiError::NoDevices | SmiError::Execution(_) => {
                Self::Execution(err.to_string())
            }
        }
    }
}

/// Runtime per-GPU data from the proprietary driver's utility.
#[cfg_attr(test, mockall::automock)]
pub trait DriverUtilityPort: Send + Sync {
    /// Whether the utility can be invoked at all.
    fn is_available(&self) -> bool;

    fn parse(&self, ctx: &DetectContext) -> Result<SmiSnapshot, SmiError>;

    fn get_driver_version(&self, ctx: &DetectContext) -> Result<String, SmiError>;

    fn get_cuda_version(&self, ctx: &DetectContext) -> Result<String, SmiError>;
}
