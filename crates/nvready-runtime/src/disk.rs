//! Free space probe via `statvfs(3)`.

use std::io;

use nix::sys::statvfs::statvfs;
use nvready_core::ports::{DetectError, DiskSpacePort};

/// Reports space available to unprivileged users on a mount point.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatvfsDiskProbe;

impl DiskSpacePort for StatvfsDiskProbe {
    fn available_bytes(&self, path: &str) -> Result<u64, DetectError> {
        let stat = statvfs(path).map_err(|errno| DetectError::from_io(path, &io::Error::from(errno)))?;
        #[allow(clippy::useless_conversion)]
        let bytes = u64::from(stat.blocks_available()).saturating_mul(u64::from(stat.fragment_size()));
        Ok(bytes)
    }
}
