//! Human-readable rendering with ANSI status markers.

use std::fmt::Write;

use nvready_core::{
    CheckResult, DetectionReport, DriverKind, DriverStatus, GpuRecord, KernelInfo, NouveauStatus,
    Readiness, Severity, ValidationReport,
};

use super::{BOLD, GREEN, RED, RESET, YELLOW};

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{BOLD}{title}:{RESET}");
    let _ = writeln!(out, "{}", "-".repeat(40));
}

pub fn render_gpus(gpus: &[GpuRecord]) -> String {
    let mut out = String::new();
    heading(&mut out, "NVIDIA GPUs");

    if gpus.is_empty() {
        let _ = writeln!(out, "  {YELLOW}○ No NVIDIA GPUs detected{RESET}");
        return out;
    }

    for gpu in gpus {
        let _ = writeln!(out, "  {GREEN}✓{RESET} {} [{}]", gpu.canonical_name(), gpu.address());
        let _ = writeln!(
            out,
            "      device {}  architecture {}  driver {}",
            gpu.device.device_id,
            gpu.architecture(),
            if gpu.device.has_driver() { gpu.device.driver.as_str() } else { "(unbound)" }
        );
        if let Some(model) = &gpu.model {
            let _ = writeln!(
                out,
                "      compute {}  memory {} MB  min driver {}{}",
                model.compute_capability,
                model.memory_mb,
                model.min_driver_version,
                if model.is_datacenter { "  (data center)" } else { "" }
            );
        }
        if let Some(runtime) = &gpu.runtime {
            let mut line = String::from("      live");
            if let (Some(used), Some(total)) = (runtime.memory_used_mb, runtime.memory_total_mb) {
                let _ = write!(line, "  memory {used}/{total} MB");
            }
            if let Some(temp) = runtime.temperature_c {
                let _ = write!(line, "  {temp}°C");
            }
            if let Some(util) = runtime.utilization_gpu_pct {
                let _ = write!(line, "  util {util}%");
            }
            if let Some(power) = runtime.power_draw_w {
                let _ = write!(line, "  {power:.1} W");
            }
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

pub fn render_driver(driver: &DriverStatus) -> String {
    let mut out = String::new();
    heading(&mut out, "Driver");

    let (color, mark) = match driver.kind {
        DriverKind::Proprietary => (GREEN, "✓"),
        DriverKind::OpenSource => (YELLOW, "!"),
        DriverKind::None => (YELLOW, "○"),
    };
    let _ = writeln!(out, "  {color}{mark} {}{RESET}", driver.kind);
    if !driver.version.is_empty() {
        let _ = writeln!(out, "      version {}", driver.version);
    }
    if !driver.cuda_version.is_empty() {
        let _ = writeln!(out, "      CUDA {}", driver.cuda_version);
    }
    out
}

pub fn render_nouveau(status: &NouveauStatus) -> String {
    let mut out = String::new();
    heading(&mut out, "Nouveau");

    if status.loaded {
        let usage = if status.in_use { "in use" } else { "idle" };
        let _ = writeln!(out, "  {YELLOW}! loaded ({usage}){RESET}");
    } else {
        let _ = writeln!(out, "  {GREEN}✓ not loaded{RESET}");
    }
    if !status.bound_devices.is_empty() {
        let _ = writeln!(out, "      bound to {}", status.bound_devices.join(", "));
    }
    if status.blacklist_exists {
        let _ = writeln!(out, "      blacklisted in {}", status.blacklist_files.join(", "));
    }
    out
}

pub fn render_kernel(kernel: &KernelInfo) -> String {
    let mut out = String::new();
    heading(&mut out, "Kernel");

    let _ = writeln!(out, "  {} ({})", kernel.release, kernel.arch);
    match &kernel.headers_path {
        Some(path) => {
            let _ = writeln!(out, "  {GREEN}✓ headers at {path}{RESET}");
        }
        None => {
            let _ = writeln!(out, "  {RED}✗ headers not installed{RESET}");
        }
    }
    let secure_boot = if kernel.secure_boot_enabled {
        format!("{YELLOW}! Secure Boot enabled{RESET}")
    } else {
        format!("{GREEN}✓ Secure Boot disabled{RESET}")
    };
    let _ = writeln!(out, "  {secure_boot}");
    out
}

fn render_check(out: &mut String, check: &CheckResult) {
    let (color, mark) = match (check.passed, check.severity) {
        (true, _) => (GREEN, "✓"),
        (false, Severity::Error) => (RED, "✗"),
        (false, _) => (YELLOW, "!"),
    };
    let _ = writeln!(out, "  {color}{mark}{RESET} {:<16} {}", check.name, check.message);
    if let Some(remediation) = &check.remediation {
        let _ = writeln!(out, "      → {remediation}");
    }
}

pub fn render_validation(report: &ValidationReport) -> String {
    let mut out = String::new();
    heading(&mut out, "Validation");

    for check in report.checks() {
        render_check(&mut out, check);
    }

    let summary = if report.passed() {
        format!("{GREEN}passed{RESET}")
    } else {
        format!("{RED}failed{RESET}")
    };
    let _ = writeln!(
        out,
        "\n  {summary}: {} errors, {} warnings",
        report.errors().len(),
        report.warnings().len()
    );
    out
}

pub fn render_readiness(verdict: &Readiness) -> String {
    let mut out = String::new();
    if verdict.ready {
        let _ = writeln!(out, "{GREEN}{BOLD}✓ Ready for NVIDIA driver installation{RESET}");
    } else {
        let _ = writeln!(out, "{RED}{BOLD}✗ Not ready for NVIDIA driver installation{RESET}");
    }
    for reason in &verdict.reasons {
        let _ = writeln!(out, "  - {reason}");
    }
    out
}

pub fn render_report(report: &DetectionReport) -> String {
    let mut out = render_gpus(&report.gpus);
    if let Some(driver) = &report.driver {
        out.push_str(&render_driver(driver));
    }
    if let Some(nouveau) = &report.nouveau {
        out.push_str(&render_nouveau(nouveau));
    }
    if let Some(kernel) = &report.kernel {
        out.push_str(&render_kernel(kernel));
    }
    if let Some(validation) = &report.validation {
        out.push_str(&render_validation(validation));
    }
    if !report.errors.is_empty() {
        heading(&mut out, "Errors");
        for error in &report.errors {
            let _ = writeln!(out, "  {RED}✗{RESET} {error}");
        }
    }
    let _ = writeln!(out, "\nCompleted in {:.2?}", report.duration);
    out
}

#[cfg(test)]
mod tests {
    use nvready_core::{CheckName, PciDevice};

    use super::*;

    #[test]
    fn test_gpu_without_sources_shows_fallback_name() {
        let gpu = GpuRecord::new(PciDevice::new("0000:01:00.0", "10de", "ffff", "030000", ""));
        let text = render_gpus(&[gpu]);
        assert!(text.contains("NVIDIA GPU (Device ID: ffff)"));
        assert!(text.contains("(unbound)"));
    }

    #[test]
    fn test_empty_gpu_list() {
        assert!(render_gpus(&[]).contains("No NVIDIA GPUs detected"));
    }

    #[test]
    fn test_validation_lists_remediation() {
        let mut report = ValidationReport::new();
        report.add(
            CheckResult::error(CheckName::BuildTools, "Missing build tools: gcc")
                .with_remediation("Install build-essential"),
        );
        report.add(CheckResult::passed(CheckName::SecureBoot, "Secure Boot is disabled"));

        let text = render_validation(&report);
        assert!(text.contains("build_tools"));
        assert!(text.contains("→ Install build-essential"));
        assert!(text.contains("1 errors, 0 warnings"));
    }

    #[test]
    fn test_readiness_lists_reasons() {
        let verdict = Readiness {
            ready: false,
            reasons: vec!["No NVIDIA GPUs detected".to_string()],
        };
        let text = render_readiness(&verdict);
        assert!(text.contains("Not ready"));
        assert!(text.contains("  - No NVIDIA GPUs detected"));
    }

    #[test]
    fn test_report_includes_branch_errors() {
        let mut report = DetectionReport::new(chrono::Utc::now());
        report.push_error("pci", "Permission denied: /sys/bus/pci/devices");
        let text = render_report(&report);
        assert!(text.contains("pci: Permission denied"));
    }
}
