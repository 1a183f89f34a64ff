//! GPU listing.

use nvready_core::DetectContext;

use super::{EXIT_OK, emit};
use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{render_gpus, to_json};

pub async fn execute(ctx: &CliContext, detect: &DetectContext, json: bool) -> Result<i32, CliError> {
    let gpus = ctx.orchestrator.detect_gpus(detect).await?;

    if json {
        emit(&to_json(&gpus)?);
        emit("\n");
    } else {
        emit(&render_gpus(&gpus));
    }
    Ok(EXIT_OK)
}
