//! Kernel, headers and Secure Boot capability.

use crate::context::DetectContext;
use crate::domain::KernelInfo;

use super::DetectError;

#[cfg_attr(test, mockall::automock)]
pub trait KernelPort: Send + Sync {
    fn get_kernel_info(&self, ctx: &DetectContext) -> Result<KernelInfo, DetectError>;

    /// Never fails; an undeterminable state reads as disabled.
    fn is_secure_boot_enabled(&self) -> bool;

    fn are_headers_installed(&self) -> bool;

    /// Distribution package providing headers for the running kernel.
    fn get_headers_package_name(&self) -> String;
}
