//! Full detection report.

use nvready_core::DetectContext;

use super::{EXIT_NEGATIVE, EXIT_OK, emit};
use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{render_report, to_json};

/// Run every detector. Branch failures are part of the report, so this
/// only fails on pre-flight cancellation.
///
/// Exits non-zero when the embedded validation report has failed.
pub async fn execute(ctx: &CliContext, detect: &DetectContext, json: bool) -> Result<i32, CliError> {
    let report = ctx.orchestrator.detect_all(detect).await?;

    if json {
        emit(&to_json(&report)?);
        emit("\n");
    } else {
        emit(&render_report(&report));
    }

    let failed = report.validation.as_ref().is_some_and(|v| !v.passed());
    Ok(if failed { EXIT_NEGATIVE } else { EXIT_OK })
}
