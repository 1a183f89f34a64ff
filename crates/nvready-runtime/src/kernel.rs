//! Running kernel, headers and Secure Boot detection.

use std::sync::Arc;

use nvready_core::ports::{DetectError, KernelPort};
use nvready_core::{DetectContext, KernelInfo};
use tracing::debug;

use crate::command::CommandRunner;
use crate::fs::FileSystem;

pub const OSRELEASE_PATH: &str = "/proc/sys/kernel/osrelease";
pub const KERNEL_VERSION_PATH: &str = "/proc/sys/kernel/version";
pub const PROC_MODULES_PATH: &str = "/proc/modules";
pub const OS_RELEASE_PATH: &str = "/etc/os-release";
pub const SECURE_BOOT_EFIVAR: &str =
    "/sys/firmware/efi/efivars/SecureBoot-8be4df61-93ca-11d2-aa0d-00e098032b8c";

/// EFI variables start with a 4-byte attribute header.
const EFIVAR_HEADER_LEN: usize = 4;

/// One line of `/proc/modules`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    pub name: String,
    pub use_count: u32,
}

/// Parse `/proc/modules`: `name size use_count deps state offset`.
pub fn parse_proc_modules(text: &str) -> Vec<ModuleEntry> {
    text.lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let name = columns.next()?;
            let use_count = columns.nth(1).and_then(|c| c.parse().ok()).unwrap_or(0);
            Some(ModuleEntry {
                name: name.to_string(),
                use_count,
            })
        })
        .collect()
}

pub struct LinuxKernelDetector {
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn CommandRunner>,
}

impl LinuxKernelDetector {
    pub fn new(fs: Arc<dyn FileSystem>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { fs, runner }
    }

    pub fn release(&self) -> Result<String, DetectError> {
        self.fs
            .read_to_string(OSRELEASE_PATH)
            .map(|s| s.trim().to_string())
            .map_err(|e| DetectError::from_io(OSRELEASE_PATH, &e))
    }

    /// Names of every loaded kernel module.
    pub fn loaded_modules(&self) -> Result<Vec<String>, DetectError> {
        let text = self
            .fs
            .read_to_string(PROC_MODULES_PATH)
            .map_err(|e| DetectError::from_io(PROC_MODULES_PATH, &e))?;
        Ok(parse_proc_modules(&text).into_iter().map(|m| m.name).collect())
    }

    fn headers_path(&self, release: &str) -> Option<String> {
        [
            format!("/lib/modules/{release}/build"),
            format!("/usr/src/linux-headers-{release}"),
            format!("/usr/src/kernels/{release}"),
        ]
        .into_iter()
        .find(|path| self.fs.exists(path))
    }

    /// `ID` followed by the `ID_LIKE` entries of `/etc/os-release`.
    fn distro_ids(&self) -> Vec<String> {
        let Ok(text) = self.fs.read_to_string(OS_RELEASE_PATH) else {
            return Vec::new();
        };

        let value = |key: &str| {
            text.lines()
                .find_map(|l| l.strip_prefix(key)?.strip_prefix('='))
                .map(|v| v.trim().trim_matches('"').trim_matches('\'').to_ascii_lowercase())
        };

        let mut ids: Vec<String> = value("ID").into_iter().collect();
        if let Some(like) = value("ID_LIKE") {
            ids.extend(like.split_whitespace().map(ToString::to_string));
        }
        ids
    }

    /// `mokutil --sb-state`; `None` when absent or inconclusive.
    fn secure_boot_from_mokutil(&self) -> Option<bool> {
        let output = match self.runner.run("mokutil", &["--sb-state"]) {
            Ok(output) => output,
            Err(e) => {
                debug!(error = %e, "mokutil unavailable");
                return None;
            }
        };

        let text = output.combined();
        if text.contains("SecureBoot enabled") {
            Some(true)
        } else if text.contains("SecureBoot disabled") {
            Some(false)
        } else {
            None
        }
    }

    /// Raw EFI variable; any failure reads as disabled.
    fn secure_boot_from_efivar(&self) -> bool {
        match self.fs.read(SECURE_BOOT_EFIVAR) {
            Ok(bytes) => bytes.get(EFIVAR_HEADER_LEN) == Some(&1),
            Err(e) => {
                debug!(error = %e, "SecureBoot EFI variable unreadable");
                false
            }
        }
    }
}

impl KernelPort for LinuxKernelDetector {
    fn get_kernel_info(&self, ctx: &DetectContext) -> Result<KernelInfo, DetectError> {
        ctx.check()?;
        let release = self.release()?;
        let version = self
            .fs
            .read_to_string(KERNEL_VERSION_PATH)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|e| {
                debug!(error = %e, "Kernel build string unavailable");
                String::new()
            });

        ctx.check()?;
        let headers_path = self.headers_path(&release);
        let secure_boot_enabled = self.is_secure_boot_enabled();

        Ok(KernelInfo {
            version,
            release,
            arch: std::env::consts::ARCH.to_string(),
            headers_installed: headers_path.is_some(),
            headers_path,
            secure_boot_enabled,
        })
    }

    fn is_secure_boot_enabled(&self) -> bool {
        self.secure_boot_from_mokutil()
            .unwrap_or_else(|| self.secure_boot_from_efivar())
    }

    fn are_headers_installed(&self) -> bool {
        self.release()
            .is_ok_and(|release| self.headers_path(&release).is_some())
    }

    fn get_headers_package_name(&self) -> String {
        let release = self.release().unwrap_or_default();
        for id in self.distro_ids() {
            match id.as_str() {
                "debian" | "ubuntu" => return format!("linux-headers-{release}"),
                "fedora" | "rhel" | "centos" => return format!("kernel-devel-{release}"),
                "arch" => return "linux-headers".to_string(),
                id if id.contains("suse") => return "kernel-default-devel".to_string(),
                _ => {}
            }
        }
        format!("linux-headers-{release}")
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::command::CommandOutput;
    use crate::command::fake::FakeRunner;
    use crate::fs::{OsFileSystem, write_file};

    const RELEASE: &str = "6.5.0-14-generic";

    fn detector(root: &Path, runner: FakeRunner) -> LinuxKernelDetector {
        LinuxKernelDetector::new(Arc::new(OsFileSystem::with_root(root)), Arc::new(runner))
    }

    fn procfs(root: &Path) {
        write_file(root, OSRELEASE_PATH, format!("{RELEASE}\n"));
        write_file(root, KERNEL_VERSION_PATH, "#14-Ubuntu SMP PREEMPT_DYNAMIC\n");
    }

    fn efivar(root: &Path, enabled: u8) {
        write_file(root, SECURE_BOOT_EFIVAR, [0x06, 0x00, 0x00, 0x00, enabled]);
    }

    #[test]
    fn test_kernel_info_with_headers() {
        let root = tempfile::tempdir().unwrap();
        procfs(root.path());
        std::fs::create_dir_all(root.path().join(format!("lib/modules/{RELEASE}/build"))).unwrap();

        let info = detector(root.path(), FakeRunner::new())
            .get_kernel_info(&DetectContext::new())
            .unwrap();
        assert_eq!(info.release, RELEASE);
        assert_eq!(info.version, "#14-Ubuntu SMP PREEMPT_DYNAMIC");
        assert_eq!(info.arch, std::env::consts::ARCH);
        assert!(info.headers_installed);
        assert_eq!(info.headers_path, Some(format!("/lib/modules/{RELEASE}/build")));
        assert!(!info.secure_boot_enabled);
    }

    #[test]
    fn test_missing_osrelease_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let kernel = detector(root.path(), FakeRunner::new());
        assert!(matches!(
            kernel.get_kernel_info(&DetectContext::new()),
            Err(DetectError::NotFound(_))
        ));
        assert!(!kernel.are_headers_installed());
    }

    #[test]
    fn test_alternate_headers_locations() {
        let root = tempfile::tempdir().unwrap();
        procfs(root.path());
        std::fs::create_dir_all(root.path().join(format!("usr/src/kernels/{RELEASE}"))).unwrap();
        assert!(detector(root.path(), FakeRunner::new()).are_headers_installed());
    }

    #[test]
    fn test_headers_package_by_distro() {
        let cases = [
            ("ID=ubuntu\nID_LIKE=debian\n", format!("linux-headers-{RELEASE}")),
            ("ID=\"rocky\"\nID_LIKE=\"rhel centos fedora\"\n", format!("kernel-devel-{RELEASE}")),
            ("ID=arch\n", "linux-headers".to_string()),
            ("ID=\"opensuse-tumbleweed\"\nID_LIKE=\"opensuse suse\"\n", "kernel-default-devel".to_string()),
            ("ID=gentoo\n", format!("linux-headers-{RELEASE}")),
        ];

        for (os_release, expected) in cases {
            let root = tempfile::tempdir().unwrap();
            procfs(root.path());
            write_file(root.path(), OS_RELEASE_PATH, os_release);
            assert_eq!(
                detector(root.path(), FakeRunner::new()).get_headers_package_name(),
                expected,
                "{os_release}"
            );
        }
    }

    #[test]
    fn test_mokutil_wins_over_efivar() {
        let root = tempfile::tempdir().unwrap();
        efivar(root.path(), 1);
        let runner = FakeRunner::new().with(
            "mokutil --sb-state",
            CommandOutput {
                success: true,
                stdout: String::new(),
                stderr: "SecureBoot disabled\n".to_string(),
            },
        );
        assert!(!detector(root.path(), runner).is_secure_boot_enabled());
    }

    #[test]
    fn test_inconclusive_mokutil_falls_back_to_efivar() {
        let root = tempfile::tempdir().unwrap();
        efivar(root.path(), 1);
        let runner = FakeRunner::new().with(
            "mokutil --sb-state",
            CommandOutput::failed("EFI variables are not supported on this system"),
        );
        assert!(detector(root.path(), runner).is_secure_boot_enabled());
    }

    #[test]
    fn test_efivar_only() {
        let root = tempfile::tempdir().unwrap();
        efivar(root.path(), 1);
        assert!(detector(root.path(), FakeRunner::new()).is_secure_boot_enabled());

        let root = tempfile::tempdir().unwrap();
        efivar(root.path(), 0);
        assert!(!detector(root.path(), FakeRunner::new()).is_secure_boot_enabled());
    }

    #[test]
    fn test_no_signal_means_disabled() {
        let root = tempfile::tempdir().unwrap();
        write_file(root.path(), SECURE_BOOT_EFIVAR, b"\x06\x00");
        assert!(!detector(root.path(), FakeRunner::new()).is_secure_boot_enabled());

        let empty = tempfile::tempdir().unwrap();
        assert!(!detector(empty.path(), FakeRunner::new()).is_secure_boot_enabled());
    }

    #[test]
    fn test_loaded_modules() {
        let root = tempfile::tempdir().unwrap();
        write_file(
            root.path(),
            PROC_MODULES_PATH,
            "nvidia_uvm 4911104 0 - Live 0x0000000000000000 (POE)\n\
             nvidia 54370304 1 nvidia_uvm, Live 0x0000000000000000 (POE)\n",
        );
        assert_eq!(
            detector(root.path(), FakeRunner::new()).loaded_modules().unwrap(),
            ["nvidia_uvm", "nvidia"]
        );
    }

    #[test]
    fn test_parse_proc_modules_use_count() {
        let modules = parse_proc_modules("nouveau 2306048 3 - Live 0x0\nbroken\n");
        assert_eq!(
            modules,
            [
                ModuleEntry { name: "nouveau".to_string(), use_count: 3 },
                ModuleEntry { name: "broken".to_string(), use_count: 0 },
            ]
        );
    }
}
