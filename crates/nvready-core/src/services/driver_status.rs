//! Driver status fallback chain.
//!
//! 1. PCI bound-driver names of the target GPUs
//! 2. Driver utility availability
//! 3. Nouveau detector
//!
//! A tier that errors or finds nothing defers to the next one. Only
//! cancellation escapes; everything else resolves to [`DriverStatus::none`]
//! at worst.

use tracing::debug;

use crate::context::DetectContext;
use crate::domain::{DriverStatus, OPEN_SOURCE_DRIVER, PROPRIETARY_DRIVER};
use crate::ports::{Capabilities, DetectError, DriverUtilityPort};

pub fn resolve_driver_status(
    caps: &Capabilities,
    ctx: &DetectContext,
) -> Result<DriverStatus, DetectError> {
    ctx.check()?;

    if let Some(pci) = &caps.pci {
        match pci.scan_target_vendor_gpus(ctx) {
            Ok(devices) => {
                if devices.iter().any(|d| d.is_bound_to(PROPRIETARY_DRIVER)) {
                    debug!("Proprietary driver bound to a GPU");
                    return proprietary_status(caps.driver_utility.as_deref(), ctx);
                }
                if devices.iter().any(|d| d.is_bound_to(OPEN_SOURCE_DRIVER)) {
                    debug!("Nouveau bound to a GPU");
                    return Ok(DriverStatus::open_source(""));
                }
            }
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => debug!(error = %e, "PCI driver inspection failed, falling back"),
        }
    }

    ctx.check()?;
    if let Some(utility) = caps.driver_utility.as_deref() {
        if utility.is_available() {
            debug!("Driver utility available without a PCI binding signal");
            return proprietary_status(Some(utility), ctx);
        }
    }

    ctx.check()?;
    if let Some(nouveau) = &caps.nouveau {
        match nouveau.detect(ctx) {
            Ok(status) if status.loaded || status.in_use => {
                return Ok(DriverStatus::open_source(""));
            }
            Ok(_) => {}
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => debug!(error = %e, "Nouveau detection failed"),
        }
    }

    Ok(DriverStatus::none())
}

/// Proprietary status with version details from the utility when it answers.
fn proprietary_status(
    utility: Option<&dyn DriverUtilityPort>,
    ctx: &DetectContext,
) -> Result<DriverStatus, DetectError> {
    let Some(utility) = utility.filter(|u| u.is_available()) else {
        return Ok(DriverStatus::proprietary("", ""));
    };

    let version = match utility.get_driver_version(ctx) {
        Ok(version) => version,
        Err(e) => {
            let e = DetectError::from(e);
            if e.is_cancelled() {
                return Err(e);
            }
            debug!(error = %e, "Driver version unavailable");
            String::new()
        }
    };

    let cuda = utility.get_cuda_version(ctx).unwrap_or_else(|e| {
        debug!(error = %e, "CUDA version unavailable");
        String::new()
    });

    Ok(DriverStatus::proprietary(version, cuda))
}
