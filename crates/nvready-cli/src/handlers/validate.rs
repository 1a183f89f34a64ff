//! Validation battery.

use nvready_core::DetectContext;

use super::{EXIT_NEGATIVE, EXIT_OK, emit};
use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{render_validation, to_json};

/// Exits non-zero when any error-severity check failed.
pub async fn execute(ctx: &CliContext, detect: &DetectContext, json: bool) -> Result<i32, CliError> {
    let report = ctx.orchestrator.validate_system(detect).await?;

    if json {
        emit(&to_json(&report)?);
        emit("\n");
    } else {
        emit(&render_validation(&report));
    }
    Ok(if report.passed() { EXIT_OK } else { EXIT_NEGATIVE })
}
