//! Validator capability: the individual checks plus the combined battery.

use std::time::Instant;

use crate::context::DetectContext;
use crate::domain::{CheckName, CheckResult, ValidationReport};

use super::DetectError;

/// Runs install-readiness checks.
///
/// Individual checks never fail: a detector failure inside a check becomes a
/// failed, error-severity [`CheckResult`]. Only the battery methods can fail,
/// and only with [`DetectError::Cancelled`].
#[cfg_attr(test, mockall::automock)]
pub trait ValidatorPort: Send + Sync {
    fn validate_kernel_version(&self, ctx: &DetectContext) -> CheckResult;

    fn validate_disk_space(&self, ctx: &DetectContext) -> CheckResult;

    fn validate_kernel_headers(&self, ctx: &DetectContext) -> CheckResult;

    fn validate_build_tools(&self, ctx: &DetectContext) -> CheckResult;

    fn validate_secure_boot(&self, ctx: &DetectContext) -> CheckResult;

    fn validate_nouveau_status(&self, ctx: &DetectContext) -> CheckResult;

    fn run_check(&self, name: CheckName, ctx: &DetectContext) -> CheckResult {
        match name {
            CheckName::KernelVersion => self.validate_kernel_version(ctx),
            CheckName::DiskSpace => self.validate_disk_space(ctx),
            CheckName::KernelHeaders => self.validate_kernel_headers(ctx),
            CheckName::BuildTools => self.validate_build_tools(ctx),
            CheckName::SecureBoot => self.validate_secure_boot(ctx),
            CheckName::NouveauStatus => self.validate_nouveau_status(ctx),
        }
    }

    /// Run the battery in declared order, appending into `report`.
    ///
    /// The context is checked before every check. On cancellation the
    /// results already appended stay in `report`.
    fn run_checks(
        &self,
        ctx: &DetectContext,
        report: &mut ValidationReport,
    ) -> Result<(), DetectError> {
        for name in CheckName::ALL {
            ctx.check()?;
            report.add(self.run_check(name, ctx));
        }
        Ok(())
    }

    fn validate(&self, ctx: &DetectContext) -> Result<ValidationReport, DetectError> {
        let started = Instant::now();
        let mut report = ValidationReport::new();
        self.run_checks(ctx, &mut report)?;
        report.complete(started.elapsed());
        Ok(report)
    }
}
