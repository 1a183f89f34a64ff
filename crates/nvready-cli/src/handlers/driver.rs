//! Installed driver summary.

use nvready_core::DetectContext;

use super::{EXIT_OK, emit};
use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{render_driver, to_json};

pub async fn execute(ctx: &CliContext, detect: &DetectContext, json: bool) -> Result<i32, CliError> {
    let driver = ctx.orchestrator.get_driver_status(detect).await?;

    if json {
        emit(&to_json(&driver)?);
        emit("\n");
    } else {
        emit(&render_driver(&driver));
    }
    Ok(EXIT_OK)
}
