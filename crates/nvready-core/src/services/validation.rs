//! Validation engine - the fixed battery of install-readiness checks.
//!
//! Each check calls one or two detector primitives and turns the answer,
//! or the failure, into a [`CheckResult`]. Nothing in here returns early on
//! a failed check; the battery driver lives on [`ValidatorPort`].

use std::sync::Arc;

use tracing::debug;

use crate::context::DetectContext;
use crate::domain::{CheckName, CheckResult, KernelVersion, NOUVEAU_BLACKLIST_PATH};
use crate::ports::{
    DetectError, DiskSpacePort, KernelPort, NouveauPort, ToolchainPort, ValidatorPort,
};
use crate::settings::Settings;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Thresholds the checks compare against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub min_kernel_version: String,
    pub required_disk_mb: u64,
    pub disk_paths: Vec<String>,
    pub build_tools: Vec<String>,
}

impl ValidationPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            min_kernel_version: settings.effective_min_kernel_version().to_string(),
            required_disk_mb: settings.effective_required_disk_mb(),
            disk_paths: settings.effective_disk_paths(),
            build_tools: settings.effective_build_tools(),
        }
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Default [`ValidatorPort`] implementation built on detector primitives.
pub struct SystemValidator {
    kernel: Arc<dyn KernelPort>,
    nouveau: Arc<dyn NouveauPort>,
    disk: Arc<dyn DiskSpacePort>,
    toolchain: Arc<dyn ToolchainPort>,
    policy: ValidationPolicy,
}

impl SystemValidator {
    pub fn new(
        kernel: Arc<dyn KernelPort>,
        nouveau: Arc<dyn NouveauPort>,
        disk: Arc<dyn DiskSpacePort>,
        toolchain: Arc<dyn ToolchainPort>,
        policy: ValidationPolicy,
    ) -> Self {
        Self {
            kernel,
            nouveau,
            disk,
            toolchain,
            policy,
        }
    }

    pub const fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }
}

impl ValidatorPort for SystemValidator {
    fn validate_kernel_version(&self, ctx: &DetectContext) -> CheckResult {
        let name = CheckName::KernelVersion;

        let Some(required) = KernelVersion::parse(&self.policy.min_kernel_version) else {
            return CheckResult::error(
                name,
                format!(
                    "Invalid minimum kernel version '{}'",
                    self.policy.min_kernel_version
                ),
            );
        };

        let info = match self.kernel.get_kernel_info(ctx) {
            Ok(info) => info,
            Err(e) => {
                return CheckResult::error(name, format!("Failed to detect kernel version: {e}"));
            }
        };

        let Some(current) = KernelVersion::parse(&info.release) else {
            return CheckResult::error(
                name,
                format!("Unable to parse kernel release '{}'", info.release),
            )
            .with_detail("current", &info.release);
        };

        if current < required {
            CheckResult::error(
                name,
                format!("Kernel {current} is older than the required {required}"),
            )
            .with_remediation(format!(
                "Upgrade to kernel {required} or newer using your distribution's package manager"
            ))
            .with_detail("current", &info.release)
            .with_detail("required", required)
        } else {
            CheckResult::passed(name, format!("Kernel {} is supported", info.release))
                .with_detail("current", &info.release)
                .with_detail("required", required)
        }
    }

    fn validate_disk_space(&self, ctx: &DetectContext) -> CheckResult {
        let name = CheckName::DiskSpace;
        let required_mb = self.policy.required_disk_mb;

        // Lowest available space across all probeable paths
        let mut lowest: Option<(&str, u64)> = None;
        for path in &self.policy.disk_paths {
            if let Err(e) = ctx.check() {
                return interrupted(name, &e);
            }
            match self.disk.available_bytes(path) {
                Ok(bytes) => {
                    let mb = bytes / BYTES_PER_MB;
                    if lowest.is_none_or(|(_, current)| mb < current) {
                        lowest = Some((path.as_str(), mb));
                    }
                }
                Err(e) => debug!(path = %path, error = %e, "Skipping unprobeable path"),
            }
        }

        let Some((path, available_mb)) = lowest else {
            return CheckResult::error(
                name,
                format!(
                    "Unable to determine free disk space on any of: {}",
                    self.policy.disk_paths.join(", ")
                ),
            );
        };

        let result = if available_mb < required_mb {
            CheckResult::error(
                name,
                format!("Only {available_mb} MB free on {path}, {required_mb} MB required"),
            )
            .with_remediation(format!(
                "Free up at least {} MB on {path}",
                required_mb - available_mb
            ))
        } else {
            CheckResult::passed(
                name,
                format!("{available_mb} MB free on {path} (lowest of checked paths)"),
            )
        };

        result
            .with_detail("path", path)
            .with_detail("available_mb", available_mb)
            .with_detail("required_mb", required_mb)
    }

    fn validate_kernel_headers(&self, ctx: &DetectContext) -> CheckResult {
        let name = CheckName::KernelHeaders;

        if self.kernel.are_headers_installed() {
            let result = CheckResult::passed(name, "Kernel headers are installed");
            return match self.kernel.get_kernel_info(ctx) {
                Ok(info) => match info.headers_path {
                    Some(path) => result.with_detail("path", path),
                    None => result,
                },
                Err(_) => result,
            };
        }

        let package = self.kernel.get_headers_package_name();
        CheckResult::error(name, "Kernel headers for the running kernel are not installed")
            .with_remediation(format!(
                "Install the '{package}' package with your distribution's package manager"
            ))
            .with_detail("package", package)
    }

    fn validate_build_tools(&self, ctx: &DetectContext) -> CheckResult {
        let name = CheckName::BuildTools;

        let mut missing: Vec<&str> = Vec::new();
        for tool in &self.policy.build_tools {
            if let Err(e) = ctx.check() {
                return interrupted(name, &e);
            }
            if !self.toolchain.is_installed(tool) {
                missing.push(tool);
            }
        }

        if missing.is_empty() {
            return CheckResult::passed(
                name,
                format!(
                    "Build tools available: {}",
                    self.policy.build_tools.join(", ")
                ),
            );
        }

        CheckResult::error(name, format!("Missing build tools: {}", missing.join(", ")))
            .with_remediation(
                "Install your distribution's build tools \
                 (build-essential, base-devel or the 'Development Tools' group)",
            )
            .with_detail("missing", missing.join(","))
    }

    fn validate_secure_boot(&self, _ctx: &DetectContext) -> CheckResult {
        let name = CheckName::SecureBoot;

        if self.kernel.is_secure_boot_enabled() {
            CheckResult::warning(
                name,
                "Secure Boot is enabled; the kernel module must be signed to load",
            )
            .with_remediation(
                "Sign the module with a Machine Owner Key enrolled via 'mokutil --import', \
                 or disable Secure Boot in the firmware settings",
            )
        } else {
            CheckResult::passed(name, "Secure Boot is disabled")
        }
    }

    fn validate_nouveau_status(&self, ctx: &DetectContext) -> CheckResult {
        let name = CheckName::NouveauStatus;

        let status = match self.nouveau.detect(ctx) {
            Ok(status) => status,
            Err(e) => {
                return CheckResult::error(name, format!("Failed to detect Nouveau status: {e}"));
            }
        };

        if !status.loaded {
            return CheckResult::passed(name, "Nouveau driver is not loaded");
        }

        let result = CheckResult::warning(name, "Nouveau driver is currently loaded");
        let result = if status.blacklist_exists {
            result
                .with_remediation(format!(
                    "Nouveau is blacklisted in {} but still loaded; regenerate the initramfs \
                     (update-initramfs -u or dracut --force) and reboot",
                    status.blacklist_files.join(", ")
                ))
                .with_detail("blacklist_files", status.blacklist_files.join(","))
        } else {
            result.with_remediation(format!(
                "Create {NOUVEAU_BLACKLIST_PATH} containing 'blacklist nouveau' and \
                 'options nouveau modeset=0', then regenerate the initramfs and reboot"
            ))
        };

        if status.bound_devices.is_empty() {
            result
        } else {
            result.with_detail("bound_devices", status.bound_devices.join(","))
        }
    }
}

/// A multi-item check stopped by cancellation before it saw every item.
fn interrupted(name: CheckName, err: &DetectError) -> CheckResult {
    debug!(check = %name, error = %err, "Check interrupted");
    CheckResult::error(name, format!("Check interrupted: {err}"))
}
