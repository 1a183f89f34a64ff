//! Nouveau load, binding and blacklist state.

use std::sync::Arc;

use nvready_core::domain::OPEN_SOURCE_DRIVER;
use nvready_core::ports::{DetectError, NouveauPort};
use nvready_core::{DetectContext, NouveauStatus};
use tracing::debug;

use crate::fs::FileSystem;
use crate::kernel::{PROC_MODULES_PATH, parse_proc_modules};

pub const NOUVEAU_DRIVER_DIR: &str = "/sys/bus/pci/drivers/nouveau";

/// Directories modprobe reads configuration from.
pub const MODPROBE_DIRS: [&str; 3] = ["/etc/modprobe.d", "/usr/lib/modprobe.d", "/lib/modprobe.d"];

pub struct NouveauDetector {
    fs: Arc<dyn FileSystem>,
}

impl NouveauDetector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// PCI addresses listed under the nouveau driver directory.
    fn bound_devices(&self) -> Vec<String> {
        match self.fs.read_dir(NOUVEAU_DRIVER_DIR) {
            Ok(entries) => entries.into_iter().filter(|e| is_pci_address(e)).collect(),
            Err(e) => {
                debug!(error = %e, "No nouveau driver directory");
                Vec::new()
            }
        }
    }

    fn blacklist_files(&self, ctx: &DetectContext) -> Result<Vec<String>, DetectError> {
        let mut matches = Vec::new();
        for dir in MODPROBE_DIRS {
            let Ok(entries) = self.fs.read_dir(dir) else {
                continue;
            };
            for name in entries.iter().filter(|n| n.ends_with(".conf")) {
                ctx.check()?;
                let path = format!("{dir}/{name}");
                match self.fs.read_to_string(&path) {
                    Ok(text) if blacklists_nouveau(&text) => matches.push(path),
                    Ok(_) => {}
                    Err(e) => debug!(path = %path, error = %e, "Skipping unreadable modprobe file"),
                }
            }
        }
        Ok(matches)
    }
}

impl NouveauPort for NouveauDetector {
    fn detect(&self, ctx: &DetectContext) -> Result<NouveauStatus, DetectError> {
        ctx.check()?;
        let modules = self
            .fs
            .read_to_string(PROC_MODULES_PATH)
            .map_err(|e| DetectError::from_io(PROC_MODULES_PATH, &e))?;
        let module = parse_proc_modules(&modules)
            .into_iter()
            .find(|m| m.name == OPEN_SOURCE_DRIVER);

        let bound_devices = self.bound_devices();
        let in_use = module.as_ref().is_some_and(|m| m.use_count > 0) || !bound_devices.is_empty();
        let blacklist_files = self.blacklist_files(ctx)?;

        debug!(
            loaded = module.is_some(),
            in_use,
            bound = bound_devices.len(),
            blacklists = blacklist_files.len(),
            "Nouveau status"
        );
        Ok(NouveauStatus {
            loaded: module.is_some(),
            in_use,
            bound_devices,
            blacklist_exists: !blacklist_files.is_empty(),
            blacklist_files,
        })
    }
}

/// An uncommented `blacklist nouveau` directive.
fn blacklists_nouveau(text: &str) -> bool {
    text.lines().any(|line| {
        let directive = line.split('#').next().unwrap_or_default();
        let mut words = directive.split_whitespace();
        words.next() == Some("blacklist") && words.next() == Some(OPEN_SOURCE_DRIVER)
    })
}

/// `dddd:bb:dd.f` in hex.
fn is_pci_address(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 12
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b':',
            10 => *b == b'.',
            _ => b.is_ascii_hexdigit(),
        })
}
