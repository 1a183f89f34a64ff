//! End-to-end orchestrator scenarios against hand-written detector fakes.
//!
//! Every fake answers from fixed data, so each scenario pins down exactly
//! how the orchestrator folds detector answers into reports and verdicts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use nvready_core::{
    Capabilities, CheckName, DetectContext, DetectError, DiskSpacePort, DriverKind,
    DriverUtilityPort, GpuDatabasePort, GpuModel, KernelInfo, KernelPort, NameResolverPort,
    NouveauPort, NouveauStatus, Orchestrator, PciDevice, PciScannerPort, Severity, SmiError,
    SmiGpu, SmiSnapshot, SystemValidator, ToolchainPort, ValidationPolicy, ValidatorPort,
};

const MB: u64 = 1024 * 1024;

// ============================================================================
// Fakes
// ============================================================================

struct FakePci(Result<Vec<PciDevice>, DetectError>);

impl PciScannerPort for FakePci {
    fn scan_all(&self, _ctx: &DetectContext) -> Result<Vec<PciDevice>, DetectError> {
        self.0.clone()
    }
}

struct FakeDatabase(Vec<GpuModel>);

impl GpuDatabasePort for FakeDatabase {
    fn lookup(&self, device_id: &str) -> Option<GpuModel> {
        self.0.iter().find(|m| m.device_id == device_id).cloned()
    }
}

struct FakeNames(HashMap<String, String>);

impl NameResolverPort for FakeNames {
    fn resolve_names(&self, _ctx: &DetectContext) -> Result<HashMap<String, String>, DetectError> {
        Ok(self.0.clone())
    }
}

struct FakeUtility(Option<SmiSnapshot>);

impl DriverUtilityPort for FakeUtility {
    fn is_available(&self) -> bool {
        self.0.is_some()
    }

    fn parse(&self, _ctx: &DetectContext) -> Result<SmiSnapshot, SmiError> {
        self.0.clone().ok_or(SmiError::NotFound)
    }

    fn get_driver_version(&self, ctx: &DetectContext) -> Result<String, SmiError> {
        self.parse(ctx).map(|s| s.driver_version)
    }

    fn get_cuda_version(&self, ctx: &DetectContext) -> Result<String, SmiError> {
        self.parse(ctx).map(|s| s.cuda_version)
    }
}

/// Utility whose version queries fail while the full query still works.
struct VersionlessUtility(SmiSnapshot);

impl DriverUtilityPort for VersionlessUtility {
    fn is_available(&self) -> bool {
        true
    }

    fn parse(&self, _ctx: &DetectContext) -> Result<SmiSnapshot, SmiError> {
        Ok(self.0.clone())
    }

    fn get_driver_version(&self, _ctx: &DetectContext) -> Result<String, SmiError> {
        Err(SmiError::Execution("driver_version query failed".to_string()))
    }

    fn get_cuda_version(&self, _ctx: &DetectContext) -> Result<String, SmiError> {
        Err(SmiError::Execution("banner unavailable".to_string()))
    }
}

struct FakeNouveau(NouveauStatus);

impl NouveauPort for FakeNouveau {
    fn detect(&self, _ctx: &DetectContext) -> Result<NouveauStatus, DetectError> {
        Ok(self.0.clone())
    }
}

#[derive(Clone)]
struct FakeKernel {
    release: &'static str,
    headers: bool,
    secure_boot: bool,
}

impl KernelPort for FakeKernel {
    fn get_kernel_info(&self, _ctx: &DetectContext) -> Result<KernelInfo, DetectError> {
        Ok(KernelInfo {
            version: "#1 SMP PREEMPT_DYNAMIC".to_string(),
            release: self.release.to_string(),
            arch: "x86_64".to_string(),
            headers_installed: self.headers,
            headers_path: self
                .headers
                .then(|| format!("/lib/modules/{}/build", self.release)),
            secure_boot_enabled: self.secure_boot,
        })
    }

    fn is_secure_boot_enabled(&self) -> bool {
        self.secure_boot
    }

    fn are_headers_installed(&self) -> bool {
        self.headers
    }

    fn get_headers_package_name(&self) -> String {
        format!("linux-headers-{}", self.release)
    }
}

/// Kernel detector that never answers in time.
struct SlowKernel(Duration);

impl KernelPort for SlowKernel {
    fn get_kernel_info(&self, _ctx: &DetectContext) -> Result<KernelInfo, DetectError> {
        std::thread::sleep(self.0);
        Ok(KernelInfo::default())
    }

    fn is_secure_boot_enabled(&self) -> bool {
        false
    }

    fn are_headers_installed(&self) -> bool {
        true
    }

    fn get_headers_package_name(&self) -> String {
        String::new()
    }
}

struct PanickingKernel;

impl KernelPort for PanickingKernel {
    fn get_kernel_info(&self, _ctx: &DetectContext) -> Result<KernelInfo, DetectError> {
        panic!("procfs reader exploded");
    }

    fn is_secure_boot_enabled(&self) -> bool {
        false
    }

    fn are_headers_installed(&self) -> bool {
        false
    }

    fn get_headers_package_name(&self) -> String {
        String::new()
    }
}

struct FakeDisk(Vec<(&'static str, u64)>);

impl DiskSpacePort for FakeDisk {
    fn available_bytes(&self, path: &str) -> Result<u64, DetectError> {
        self.0
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, mb)| mb * MB)
            .ok_or_else(|| DetectError::NotFound(path.to_string()))
    }
}

struct FakeToolchain(Vec<&'static str>);

impl ToolchainPort for FakeToolchain {
    fn is_installed(&self, tool: &str) -> bool {
        self.0.iter().any(|t| *t == tool)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn rtx_4090(driver: &str) -> PciDevice {
    PciDevice::new("0000:01:00.0", "10de", "2684", "030000", driver)
}

fn ada_model() -> GpuModel {
    GpuModel {
        device_id: "2684".to_string(),
        name: "GeForce RTX 4090".to_string(),
        architecture: "Ada Lovelace".to_string(),
        min_driver_version: "520.56.06".to_string(),
        compute_capability: "8.9".to_string(),
        memory_mb: 24576,
        is_datacenter: false,
    }
}

fn snapshot() -> SmiSnapshot {
    SmiSnapshot {
        driver_version: "550.54.14".to_string(),
        cuda_version: "12.4".to_string(),
        gpus: vec![SmiGpu {
            index: 0,
            name: "NVIDIA GeForce RTX 4090".to_string(),
            pci_bus_id: "00000000:01:00.0".to_string(),
            memory_total_mb: Some(24564),
            memory_used_mb: Some(1024),
            memory_free_mb: Some(23540),
            temperature_c: Some(41),
            ..SmiGpu::default()
        }],
    }
}

fn healthy_kernel() -> FakeKernel {
    FakeKernel {
        release: "6.5.0-14-generic",
        headers: true,
        secure_boot: false,
    }
}

fn policy() -> ValidationPolicy {
    ValidationPolicy {
        disk_paths: vec!["/".to_string(), "/usr".to_string()],
        ..ValidationPolicy::default()
    }
}

fn validator(
    kernel: FakeKernel,
    nouveau: NouveauStatus,
    disk: Vec<(&'static str, u64)>,
) -> SystemValidator {
    SystemValidator::new(
        Arc::new(kernel),
        Arc::new(FakeNouveau(nouveau)),
        Arc::new(FakeDisk(disk)),
        Arc::new(FakeToolchain(vec!["gcc", "make", "ld"])),
        policy(),
    )
}

/// A fully wired host with one proprietary-bound GPU.
fn healthy_caps() -> Capabilities {
    let nouveau = NouveauStatus::default();
    Capabilities::new()
        .with_pci(Arc::new(FakePci(Ok(vec![rtx_4090("nvidia")]))))
        .with_database(Arc::new(FakeDatabase(vec![ada_model()])))
        .with_driver_utility(Arc::new(FakeUtility(Some(snapshot()))))
        .with_nouveau(Arc::new(FakeNouveau(nouveau.clone())))
        .with_kernel(Arc::new(healthy_kernel()))
        .with_validator(Arc::new(validator(
            healthy_kernel(),
            nouveau,
            vec![("/", 50_000), ("/usr", 40_000)],
        )))
}

fn loaded_nouveau() -> NouveauStatus {
    NouveauStatus {
        loaded: true,
        in_use: true,
        bound_devices: vec!["0000:01:00.0".to_string()],
        blacklist_exists: false,
        blacklist_files: vec![],
    }
}

// ============================================================================
// DetectAll
// ============================================================================

#[tokio::test]
async fn test_proprietary_host_is_fully_enriched() {
    let orchestrator = Orchestrator::new(healthy_caps());
    let report = orchestrator.detect_all(&DetectContext::new()).await.unwrap();

    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert!(report.has_nvidia_gpus());
    assert_eq!(report.gpus.len(), 1);

    let gpu = &report.gpus[0];
    assert_eq!(gpu.model.as_ref().map(|m| m.architecture.as_str()), Some("Ada Lovelace"));
    let runtime = gpu.runtime.as_ref().expect("utility snapshot attached");
    assert_eq!(runtime.memory_total_mb, Some(24564));
    assert_eq!(runtime.temperature_c, Some(41));

    let driver = report.driver.expect("driver status");
    assert!(driver.installed);
    assert_eq!(driver.kind, DriverKind::Proprietary);
    assert_eq!(driver.version, "550.54.14");
    assert_eq!(driver.cuda_version, "12.4");
}

#[tokio::test]
async fn test_driver_versions_backfilled_from_utility_snapshot() {
    let caps = healthy_caps().with_driver_utility(Arc::new(VersionlessUtility(snapshot())));
    let report = Orchestrator::new(caps)
        .detect_all(&DetectContext::new())
        .await
        .unwrap();

    let driver = report.driver.expect("driver status");
    assert_eq!(driver.kind, DriverKind::Proprietary);
    assert_eq!(driver.version, "550.54.14");
    assert_eq!(driver.cuda_version, "12.4");
    assert!(report.gpus[0].runtime.is_some());
}

#[tokio::test]
async fn test_report_lists_every_pci_function() {
    let devices = vec![
        PciDevice::new("0000:00:02.0", "8086", "a780", "030000", "i915"),
        rtx_4090("nvidia"),
        PciDevice::new("0000:01:00.1", "10de", "22ba", "040300", "snd_hda_intel"),
    ];
    let caps = healthy_caps().with_pci(Arc::new(FakePci(Ok(devices))));
    let report = Orchestrator::new(caps)
        .detect_all(&DetectContext::new())
        .await
        .unwrap();

    assert_eq!(report.pci_devices.len(), 3);
    assert_eq!(report.gpus.len(), 1);
    assert_eq!(report.gpus[0].address(), "0000:01:00.0");
}

#[tokio::test]
async fn test_nouveau_host_reports_open_source_driver() {
    let caps = Capabilities::new()
        .with_pci(Arc::new(FakePci(Ok(vec![rtx_4090("nouveau")]))))
        .with_driver_utility(Arc::new(FakeUtility(None)))
        .with_nouveau(Arc::new(FakeNouveau(loaded_nouveau())))
        .with_kernel(Arc::new(healthy_kernel()))
        .with_validator(Arc::new(validator(
            healthy_kernel(),
            loaded_nouveau(),
            vec![("/", 50_000), ("/usr", 40_000)],
        )));

    let report = Orchestrator::new(caps)
        .detect_all(&DetectContext::new())
        .await
        .unwrap();

    assert_eq!(report.driver.map(|d| d.kind), Some(DriverKind::OpenSource));
    assert!(report.gpus[0].runtime.is_none());

    let validation = report.validation.expect("validation ran");
    let check = validation.get(CheckName::NouveauStatus).expect("nouveau check");
    assert!(!check.passed);
    assert_eq!(check.severity, Severity::Warning);
    let remediation = check.remediation.as_deref().unwrap_or_default();
    assert!(remediation.contains("Create /etc/modprobe.d/blacklist-nouveau.conf"));
}

#[tokio::test]
async fn test_pci_failure_is_isolated_to_one_error() {
    let caps = Capabilities {
        pci: Some(Arc::new(FakePci(Err(DetectError::PermissionDenied(
            "/sys/bus/pci/devices".to_string(),
        ))))),
        ..healthy_caps()
    }
    .with_driver_utility(Arc::new(FakeUtility(None)));

    let report = Orchestrator::new(caps)
        .detect_all(&DetectContext::new())
        .await
        .unwrap();

    assert!(!report.has_nvidia_gpus());
    assert_eq!(report.errors.len(), 1, "errors: {:?}", report.errors);
    assert_eq!(report.errors[0].source, "pci");
    assert!(report.kernel.is_some());
    assert!(report.nouveau.is_some());
    assert_eq!(report.validation.map(|v| v.checks().len()), Some(CheckName::ALL.len()));
    assert_eq!(report.driver.map(|d| d.kind), Some(DriverKind::None));
}

#[tokio::test]
async fn test_panicking_branch_is_recorded_by_name() {
    let caps = healthy_caps().with_kernel(Arc::new(PanickingKernel));

    let report = Orchestrator::new(caps)
        .detect_all(&DetectContext::new())
        .await
        .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].source, "kernel");
    assert!(report.kernel.is_none());
    assert!(report.has_nvidia_gpus());
    assert!(report.validation.is_some());
}

#[tokio::test]
async fn test_deadline_yields_partial_report() {
    let caps = healthy_caps().with_kernel(Arc::new(SlowKernel(Duration::from_millis(500))));
    let ctx = DetectContext::with_timeout(Duration::from_millis(50));

    let started = std::time::Instant::now();
    let report = Orchestrator::new(caps).detect_all(&ctx).await.unwrap();

    assert!(started.elapsed() < Duration::from_millis(400));
    assert!(report.kernel.is_none());
    assert!(
        report
            .errors
            .iter()
            .any(|e| e.source == "orchestrator" && e.message.contains("deadline exceeded"))
    );
}

#[tokio::test]
async fn test_cancelled_before_start_is_an_error() {
    let ctx = DetectContext::new();
    ctx.cancel();

    let err = Orchestrator::new(healthy_caps())
        .detect_all(&ctx)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_missing_capabilities_skip_branches() {
    let report = Orchestrator::new(Capabilities::new())
        .detect_all(&DetectContext::new())
        .await
        .unwrap();

    assert!(report.errors.is_empty());
    assert!(report.pci_devices.is_empty());
    assert!(report.kernel.is_none());
    assert!(report.validation.is_none());
    assert_eq!(report.driver.map(|d| d.kind), Some(DriverKind::None));
}

// ============================================================================
// DetectGPUs / ValidateSystem
// ============================================================================

#[tokio::test]
async fn test_detect_gpus_prefers_live_name() {
    let names = HashMap::from([(
        "01:00.0".to_string(),
        "GeForce RTX 4090 D".to_string(),
    )]);
    let caps = healthy_caps()
        .with_driver_utility(Arc::new(FakeUtility(None)))
        .with_names(Arc::new(FakeNames(names)));

    let gpus = Orchestrator::new(caps)
        .detect_gpus(&DetectContext::new())
        .await
        .unwrap();

    assert_eq!(gpus.len(), 1);
    assert_eq!(gpus[0].canonical_name(), "GeForce RTX 4090 D");
    assert_eq!(gpus[0].architecture(), "Ada Lovelace");
}

#[tokio::test]
async fn test_detect_gpus_requires_pci_capability() {
    let err = Orchestrator::new(Capabilities::new())
        .detect_gpus(&DetectContext::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DetectError::Configuration(_)));
}

#[tokio::test]
async fn test_lowest_disk_path_decides() {
    let validator = validator(
        healthy_kernel(),
        NouveauStatus::default(),
        vec![("/", 500), ("/usr", 5000)],
    );
    let result = validator.validate_disk_space(&DetectContext::new());

    assert!(!result.passed);
    assert_eq!(result.severity, Severity::Error);
    assert_eq!(result.details.get("path").map(String::as_str), Some("/"));
    assert!(result.message.contains("on /,"));
}

// ============================================================================
// IsReadyForInstall
// ============================================================================

#[tokio::test]
async fn test_healthy_host_is_ready() {
    let verdict = Orchestrator::new(healthy_caps())
        .is_ready_for_install(&DetectContext::new())
        .await
        .unwrap();

    assert!(verdict.ready);
    assert!(verdict.reasons.is_empty());
}

#[tokio::test]
async fn test_loaded_nouveau_is_only_a_warning() {
    let caps = healthy_caps()
        .with_nouveau(Arc::new(FakeNouveau(loaded_nouveau())))
        .with_validator(Arc::new(validator(
            healthy_kernel(),
            loaded_nouveau(),
            vec![("/", 50_000), ("/usr", 40_000)],
        )));

    let verdict = Orchestrator::new(caps)
        .is_ready_for_install(&DetectContext::new())
        .await
        .unwrap();

    assert!(verdict.ready);
    assert_eq!(
        verdict.reasons,
        ["Warning: Nouveau driver is currently loaded and must be disabled during installation"]
    );
}

#[tokio::test]
async fn test_no_gpus_is_never_ready() {
    let caps = healthy_caps().with_pci(Arc::new(FakePci(Ok(vec![PciDevice::new(
        "0000:00:02.0",
        "8086",
        "a780",
        "030000",
        "i915",
    )]))));

    let verdict = Orchestrator::new(caps)
        .is_ready_for_install(&DetectContext::new())
        .await
        .unwrap();

    assert!(!verdict.ready);
    assert_eq!(verdict.reasons, ["No NVIDIA GPUs detected"]);
}

#[tokio::test]
async fn test_blocking_validation_failures_are_listed_in_order() {
    let old_kernel = FakeKernel {
        release: "3.2.0-4-amd64",
        headers: false,
        secure_boot: true,
    };
    let caps = healthy_caps().with_validator(Arc::new(validator(
        old_kernel,
        NouveauStatus::default(),
        vec![("/", 500), ("/usr", 5000)],
    )));

    let verdict = Orchestrator::new(caps)
        .is_ready_for_install(&DetectContext::new())
        .await
        .unwrap();

    assert!(!verdict.ready);
    assert_eq!(verdict.reasons.len(), 3);
    assert!(verdict.reasons[0].starts_with("kernel_version: Kernel 3.2.0 is older"));
    assert!(verdict.reasons[1].starts_with("disk_space: Only 500 MB free on /"));
    assert!(verdict.reasons[2].starts_with("kernel_headers: "));
    assert!(verdict.reasons[2].contains("linux-headers-3.2.0-4-amd64"));
}

#[tokio::test]
async fn test_gpu_detection_failure_becomes_reason() {
    let caps = Capabilities {
        pci: None,
        ..healthy_caps()
    };

    let verdict = Orchestrator::new(caps)
        .is_ready_for_install(&DetectContext::new())
        .await
        .unwrap();

    assert!(!verdict.ready);
    assert!(verdict.reasons[0].starts_with("GPU detection failed: "));
}

#[tokio::test]
async fn test_readiness_propagates_cancellation() {
    let ctx = DetectContext::new();
    ctx.cancel();

    let err = Orchestrator::new(healthy_caps())
        .is_ready_for_install(&ctx)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}
