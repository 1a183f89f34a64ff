//! Build toolchain lookup on `PATH`.

use std::ffi::OsString;

use nvready_core::ports::ToolchainPort;

#[derive(Debug, Clone, Default)]
pub struct WhichToolchainProbe {
    search_path: Option<OsString>,
}

impl WhichToolchainProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search these directories instead of the process `PATH`.
    #[must_use]
    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }
}

impl ToolchainPort for WhichToolchainProbe {
    fn is_installed(&self, tool: &str) -> bool {
        match &self.search_path {
            Some(path) => which::which_in(tool, Some(path), "/").is_ok(),
            None => which::which(tool).is_ok(),
        }
    }
}
