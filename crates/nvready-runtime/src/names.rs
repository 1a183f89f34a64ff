//! Live device names from `lspci`.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use nvready_core::DetectContext;
use nvready_core::ports::{DetectError, NameResolverPort};
use tracing::debug;

use crate::command::CommandRunner;

/// Resolves bus addresses to marketing names via `lspci -D -mm`.
pub struct LspciNameResolver {
    runner: Arc<dyn CommandRunner>,
}

impl LspciNameResolver {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl NameResolverPort for LspciNameResolver {
    fn resolve_names(&self, ctx: &DetectContext) -> Result<HashMap<String, String>, DetectError> {
        ctx.check()?;
        let output = match self.runner.run("lspci", &["-D", "-mm"]) {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("lspci not installed, no live names");
                return Ok(HashMap::new());
            }
            Err(e) => return Err(DetectError::from_io("lspci", &e)),
        };

        if !output.success {
            return Err(DetectError::Execution(format!(
                "lspci failed: {}",
                output.stderr.trim()
            )));
        }

        Ok(parse_lspci_mm(&output.stdout))
    }
}

/// Parse `lspci -D -mm` lines into `address -> display name`.
///
/// `0000:01:00.0 "VGA compatible controller" "NVIDIA Corporation" "AD102 [GeForce RTX 4090]" ...`
pub fn parse_lspci_mm(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let address = line.split_whitespace().next()?;
            // Quoted fields sit at the odd positions of a split on '"'
            let fields: Vec<&str> = line.split('"').skip(1).step_by(2).collect();
            let device = fields.get(2)?.trim();
            let name = display_name(device);
            (!name.is_empty()).then(|| (address.to_string(), name))
        })
        .collect()
}

/// Prefer the bracketed marketing name: `AD102 [GeForce RTX 4090]`.
fn display_name(device: &str) -> String {
    let bracketed = device
        .split_once('[')
        .and_then(|(_, rest)| rest.split_once(']'))
        .map(|(inner, _)| inner.trim())
        .filter(|inner| !inner.is_empty());
    bracketed.unwrap_or(device).trim().to_string()
}
