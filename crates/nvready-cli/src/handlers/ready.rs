//! Install-readiness verdict.

use nvready_core::DetectContext;

use super::{EXIT_NEGATIVE, EXIT_OK, emit};
use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{render_readiness, to_json};

/// Print the verdict and its reasons. The exit status is the verdict:
/// 0 when an install may proceed, 1 otherwise.
pub async fn execute(ctx: &CliContext, detect: &DetectContext, json: bool) -> Result<i32, CliError> {
    let verdict = ctx.orchestrator.is_ready_for_install(detect).await?;

    if json {
        emit(&to_json(&verdict)?);
        emit("\n");
    } else {
        emit(&render_readiness(&verdict));
    }
    Ok(if verdict.ready { EXIT_OK } else { EXIT_NEGATIVE })
}
