//! Linux detectors for nvready.
//!
//! Each detector implements one capability port from `nvready-core` on top
//! of two primitives: a rooted [`FileSystem`] for sysfs/procfs/etc reads
//! and a [`CommandRunner`] for subprocesses. [`system_capabilities`] wires
//! the real ones together.

#![deny(unsafe_code)]

pub mod command;
mod database;
mod disk;
pub mod fs;
mod kernel;
mod names;
mod nouveau;
mod pci;
mod smi;
mod toolchain;

use std::sync::Arc;

use nvready_core::{Capabilities, Settings, SystemValidator, ValidationPolicy};
use tracing::debug;

pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use database::StaticGpuDatabase;
pub use disk::StatvfsDiskProbe;
pub use fs::{FileSystem, OsFileSystem};
pub use kernel::{LinuxKernelDetector, ModuleEntry, parse_proc_modules};
pub use names::{LspciNameResolver, parse_lspci_mm};
pub use nouveau::NouveauDetector;
pub use pci::SysfsPciScanner;
pub use smi::{NvidiaSmi, parse_cuda_version, parse_query_csv};
pub use toolchain::WhichToolchainProbe;

/// Build the real capability set for this host.
pub fn system_capabilities(settings: &Settings) -> Capabilities {
    let fs: Arc<dyn FileSystem> = Arc::new(
        settings
            .sysfs_root
            .as_deref()
            .map_or_else(OsFileSystem::new, OsFileSystem::with_root),
    );
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
    capabilities_with(settings, &fs, &runner)
}

/// Build the capability set on explicit primitives.
pub fn capabilities_with(
    settings: &Settings,
    fs: &Arc<dyn FileSystem>,
    runner: &Arc<dyn CommandRunner>,
) -> Capabilities {
    debug!(root = ?settings.sysfs_root, "Wiring system capabilities");

    let kernel = Arc::new(LinuxKernelDetector::new(Arc::clone(fs), Arc::clone(runner)));
    let nouveau = Arc::new(NouveauDetector::new(Arc::clone(fs)));
    let validator = SystemValidator::new(
        kernel.clone(),
        nouveau.clone(),
        Arc::new(StatvfsDiskProbe),
        Arc::new(WhichToolchainProbe::new()),
        ValidationPolicy::from_settings(settings),
    );

    Capabilities::new()
        .with_pci(Arc::new(SysfsPciScanner::new(Arc::clone(fs))))
        .with_database(Arc::new(StaticGpuDatabase::new()))
        .with_names(Arc::new(LspciNameResolver::new(Arc::clone(runner))))
        .with_driver_utility(Arc::new(NvidiaSmi::new(Arc::clone(runner))))
        .with_nouveau(nouveau)
        .with_kernel(kernel)
        .with_validator(Arc::new(validator))
}
