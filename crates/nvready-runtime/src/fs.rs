//! Rooted, read-only filesystem access.
//!
//! Every detector reads absolute host paths (`/sys/...`, `/proc/...`,
//! `/etc/...`) through [`FileSystem`]. [`OsFileSystem`] re-roots those paths
//! under a configurable directory so tests and chroots can supply their own
//! tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &str) -> io::Result<String>;

    fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Entry names of a directory, sorted.
    fn read_dir(&self, path: &str) -> io::Result<Vec<String>>;

    fn read_link(&self, path: &str) -> io::Result<PathBuf>;

    fn exists(&self, path: &str) -> bool;
}

/// [`FileSystem`] backed by the real OS, rooted at `/` by default.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    root: PathBuf,
}

impl OsFileSystem {
    pub fn new() -> Self {
        Self::with_root("/")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an absolute host path into the root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Default for OsFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let mut names = fs::read_dir(self.resolve(path))?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    fn read_link(&self, path: &str) -> io::Result<PathBuf> {
        fs::read_link(self.resolve(path))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }
}

/// Create `path` (absolute, host-style) under `root` with parent dirs.
#[cfg(test)]
pub(crate) fn write_file(root: &Path, path: &str, contents: impl AsRef<[u8]>) {
    let target = root.join(path.trim_start_matches('/'));
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(target, contents).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_reroots_absolute_paths() {
        let fs = OsFileSystem::with_root("/tmp/fake");
        assert_eq!(
            fs.resolve("/proc/modules"),
            PathBuf::from("/tmp/fake/proc/modules")
        );
        assert_eq!(OsFileSystem::new().resolve("/proc/modules"), PathBuf::from("/proc/modules"));
    }

    #[test]
    fn test_read_dir_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.conf", "a.conf", "c.conf"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let fs = OsFileSystem::with_root(dir.path());
        assert_eq!(fs.read_dir("/").unwrap(), ["a.conf", "b.conf", "c.conf"]);
        assert!(fs.exists("/a.conf"));
        assert!(!fs.exists("/missing"));
    }
}
