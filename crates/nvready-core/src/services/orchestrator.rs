//! Detection orchestrator - fans out to every detector and folds the
//! answers into one report.
//!
//! A full run launches five independent branches on blocking worker
//! threads:
//!
//! 1. full PCI scan + enrichment of the target GPUs among it
//! 2. driver status
//! 3. Nouveau status
//! 4. kernel info
//! 5. system validation
//!
//! Branches share one [`DetectionReport`] behind a single mutex. Each branch
//! does its blocking work unlocked and takes the lock only to write its own
//! fields. A failing or panicking branch appends to the report's error list
//! and never disturbs the others.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Utc;
use tokio::task::{Id, JoinSet};
use tracing::{debug, warn};

use crate::context::DetectContext;
use crate::domain::{
    CheckResult, DetectionReport, DriverKind, DriverStatus, GpuRecord,
    Readiness, Reason, SmiSnapshot, TARGET_VENDOR_NAME, ValidationReport,
};
use crate::ports::{Capabilities, DetectError, DriverUtilityPort, NameResolverPort};

use super::driver_status::resolve_driver_status;
use super::enrichment::{attach_runtime, enrich_devices};

type SharedReport = Arc<Mutex<DetectionReport>>;

/// Top-level coordinator for readiness detection.
///
/// Holds no state between calls; every operation starts from zero.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    caps: Capabilities,
}

impl Orchestrator {
    pub fn new(caps: Capabilities) -> Self {
        Self { caps }
    }

    pub const fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Run every configured detector concurrently.
    ///
    /// Returns an error only if `ctx` is already done before any work
    /// starts. Cancellation after that point still yields a best-effort
    /// report with one cancellation entry in its error list.
    pub async fn detect_all(&self, ctx: &DetectContext) -> Result<DetectionReport, DetectError> {
        ctx.check()?;

        let started = Instant::now();
        let shared: SharedReport = Arc::new(Mutex::new(DetectionReport::new(Utc::now())));
        let mut branches = JoinSet::new();
        let mut names: HashMap<Id, &'static str> = HashMap::new();

        let mut spawn = |name: &'static str, f: Box<dyn FnOnce() + Send>| {
            let handle = branches.spawn_blocking(f);
            names.insert(handle.id(), name);
        };

        if let Some(pci) = self.caps.pci.clone() {
            let (caps, ctx, report) = (self.caps.clone(), ctx.clone(), Arc::clone(&shared));
            spawn(
                "pci",
                Box::new(move || {
                    let outcome = pci.scan_all(&ctx).map(|devices| {
                        let live = lookup_names(caps.names.as_deref(), &ctx);
                        let gpus = enrich_devices(&devices, caps.database.as_deref(), &live);
                        (devices, gpus)
                    });
                    with_report(&report, |r| match outcome {
                        Ok((devices, gpus)) => {
                            r.pci_devices = devices;
                            r.gpus = gpus;
                        }
                        Err(e) => r.push_error("pci", e),
                    });
                }),
            );
        } else {
            debug!("No PCI capability configured, skipping hardware scan");
        }

        {
            let (caps, ctx, report) = (self.caps.clone(), ctx.clone(), Arc::clone(&shared));
            spawn(
                "driver",
                Box::new(move || {
                    let outcome = resolve_driver_status(&caps, &ctx);
                    with_report(&report, |r| match outcome {
                        Ok(status) => r.driver = Some(status),
                        Err(e) => r.push_error("driver", e),
                    });
                }),
            );
        }

        if let Some(nouveau) = self.caps.nouveau.clone() {
            let (ctx, report) = (ctx.clone(), Arc::clone(&shared));
            spawn(
                "nouveau",
                Box::new(move || {
                    let outcome = ctx.check().and_then(|()| nouveau.detect(&ctx));
                    with_report(&report, |r| match outcome {
                        Ok(status) => r.nouveau = Some(status),
                        Err(e) => r.push_error("nouveau", e),
                    });
                }),
            );
        }

        if let Some(kernel) = self.caps.kernel.clone() {
            let (ctx, report) = (ctx.clone(), Arc::clone(&shared));
            spawn(
                "kernel",
                Box::new(move || {
                    let outcome = ctx.check().and_then(|()| kernel.get_kernel_info(&ctx));
                    with_report(&report, |r| match outcome {
                        Ok(info) => r.kernel = Some(info),
                        Err(e) => r.push_error("kernel", e),
                    });
                }),
            );
        }

        if let Some(validator) = self.caps.validator.clone() {
            let (ctx, report) = (ctx.clone(), Arc::clone(&shared));
            spawn(
                "validation",
                Box::new(move || {
                    let started = Instant::now();
                    let mut validation = ValidationReport::new();
                    let outcome = validator.run_checks(&ctx, &mut validation);
                    validation.complete(started.elapsed());
                    with_report(&report, |r| {
                        r.validation = Some(validation);
                        if let Err(e) = outcome {
                            r.push_error("validation", e);
                        }
                    });
                }),
            );
        }

        let interrupted = tokio::select! {
            () = join_branches(&mut branches, &names, &shared) => false,
            () = ctx.done() => true,
        };

        if interrupted {
            // Workers still blocked in a syscall finish detached; their
            // writes land in the shared report after it has been taken.
            branches.detach_all();
            let reason = ctx
                .check()
                .err()
                .map_or_else(|| "operation was cancelled".to_string(), |e| e.to_string());
            warn!(reason = %reason, "Detection interrupted before all branches joined");
            with_report(&shared, |r| r.push_error("orchestrator", reason));
        } else {
            self.enrich_with_utility(ctx, &shared).await;
        }

        let mut report = with_report(&shared, |r| {
            let started_at = r.started_at;
            std::mem::replace(r, DetectionReport::new(started_at))
        });
        report.duration = started.elapsed();
        debug!(
            gpus = report.gpus.len(),
            errors = report.errors.len(),
            elapsed = ?report.duration,
            "Detection complete"
        );
        Ok(report)
    }

    /// Scan and enrich target GPUs only; no driver or validation work.
    pub async fn detect_gpus(&self, ctx: &DetectContext) -> Result<Vec<GpuRecord>, DetectError> {
        ctx.check()?;
        let pci = self
            .caps
            .pci
            .clone()
            .ok_or_else(|| DetectError::missing_capability("PCI scanner"))?;

        let caps = self.caps.clone();
        let task_ctx = ctx.clone();
        let mut gpus = run_blocking("gpu scan", move || {
            let devices = pci.scan_target_vendor_gpus(&task_ctx)?;
            let live = lookup_names(caps.names.as_deref(), &task_ctx);
            Ok(enrich_devices(&devices, caps.database.as_deref(), &live))
        })
        .await?;

        if let Some(snapshot) = self.utility_snapshot(ctx).await {
            attach_runtime(&mut gpus, &snapshot);
        }
        debug!(count = gpus.len(), "GPU detection complete");
        Ok(gpus)
    }

    /// Resolve the installed driver through the fallback chain.
    pub async fn get_driver_status(&self, ctx: &DetectContext) -> Result<DriverStatus, DetectError> {
        ctx.check()?;
        let caps = self.caps.clone();
        let task_ctx = ctx.clone();
        run_blocking("driver status", move || resolve_driver_status(&caps, &task_ctx)).await
    }

    /// Run the validation battery.
    pub async fn validate_system(
        &self,
        ctx: &DetectContext,
    ) -> Result<ValidationReport, DetectError> {
        ctx.check()?;
        let validator = self
            .caps
            .validator
            .clone()
            .ok_or_else(|| DetectError::missing_capability("validator"))?;
        let task_ctx = ctx.clone();
        run_blocking("validation", move || validator.validate(&task_ctx)).await
    }

    /// Decide whether a driver install may proceed.
    ///
    /// Reasons accumulate in a fixed order: GPU detection failure, no GPUs,
    /// each blocking validation failure, then a `"Warning: "` line if
    /// Nouveau is loaded. Only cancellation is returned as an error.
    pub async fn is_ready_for_install(&self, ctx: &DetectContext) -> Result<Readiness, DetectError> {
        ctx.check()?;
        let mut reasons = Vec::new();

        let gpu_count = match self.detect_gpus(ctx).await {
            Ok(gpus) => {
                if gpus.is_empty() {
                    reasons.push(Reason::blocking(format!(
                        "No {TARGET_VENDOR_NAME} GPUs detected"
                    )));
                }
                gpus.len()
            }
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                reasons.push(Reason::blocking(format!("GPU detection failed: {e}")));
                0
            }
        };

        if self.caps.validator.is_some() {
            match self.validate_system(ctx).await {
                Ok(report) => {
                    reasons.extend(report.errors().iter().map(|c| Reason::blocking(check_reason(c))));
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => reasons.push(Reason::blocking(format!("System validation failed: {e}"))),
            }
        } else {
            debug!("No validator configured, skipping system validation");
        }

        if let Some(nouveau) = self.caps.nouveau.clone() {
            let task_ctx = ctx.clone();
            match run_blocking("nouveau", move || nouveau.detect(&task_ctx)).await {
                Ok(status) if status.loaded => reasons.push(Reason::warning(
                    "Nouveau driver is currently loaded and must be disabled during installation",
                )),
                Ok(_) => {}
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => debug!(error = %e, "Nouveau detection failed"),
            }
        }

        let verdict = Readiness::evaluate(gpu_count, &reasons);
        debug!(ready = verdict.ready, reasons = verdict.reasons.len(), "Readiness evaluated");
        Ok(verdict)
    }

    /// Positional utility pass over the joined report. Runs only after the
    /// PCI and driver branches have written their fields.
    async fn enrich_with_utility(&self, ctx: &DetectContext, shared: &SharedReport) {
        let Some(snapshot) = self.utility_snapshot(ctx).await else {
            return;
        };

        with_report(shared, |r| {
            attach_runtime(&mut r.gpus, &snapshot);
            if let Some(driver) = r.driver.as_mut() {
                if driver.kind == DriverKind::Proprietary {
                    if driver.version.is_empty() {
                        driver.version.clone_from(&snapshot.driver_version);
                    }
                    if driver.cuda_version.is_empty() {
                        driver.cuda_version.clone_from(&snapshot.cuda_version);
                    }
                }
            }
        });
    }

    /// Best-effort utility snapshot; unavailability is not an error.
    async fn utility_snapshot(&self, ctx: &DetectContext) -> Option<SmiSnapshot> {
        let utility: Arc<dyn DriverUtilityPort> = self.caps.driver_utility.clone()?;
        let task_ctx = ctx.clone();
        let outcome = run_blocking("driver utility", move || {
            if !utility.is_available() {
                return Ok(None);
            }
            task_ctx.check()?;
            Ok(utility.parse(&task_ctx).ok())
        })
        .await;

        match outcome {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(error = %e, "Driver utility enrichment skipped");
                None
            }
        }
    }
}

/// Render a blocking validation failure as a readiness reason.
fn check_reason(check: &CheckResult) -> String {
    match &check.remediation {
        Some(remediation) => format!("{}: {} ({remediation})", check.name, check.message),
        None => format!("{}: {}", check.name, check.message),
    }
}

/// Live names are best-effort; a resolver failure leaves the map empty.
fn lookup_names(
    resolver: Option<&dyn NameResolverPort>,
    ctx: &DetectContext,
) -> HashMap<String, String> {
    let Some(resolver) = resolver else {
        return HashMap::new();
    };
    resolver.resolve_names(ctx).unwrap_or_else(|e| {
        debug!(error = %e, "Live name resolution unavailable");
        HashMap::new()
    })
}

/// Lock the shared report for one write. A poisoned lock is recovered,
/// since every write leaves the report consistent.
fn with_report<T>(report: &SharedReport, f: impl FnOnce(&mut DetectionReport) -> T) -> T {
    let mut guard = report.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

/// Wait for every branch. Panics are recorded against the branch name.
async fn join_branches(
    branches: &mut JoinSet<()>,
    names: &HashMap<Id, &'static str>,
    shared: &SharedReport,
) {
    while let Some(joined) = branches.join_next().await {
        if let Err(e) = joined {
            let branch = names.get(&e.id()).copied().unwrap_or("unknown");
            warn!(branch, error = %e, "Detection branch panicked");
            with_report(shared, |r| r.push_error(branch, format!("branch panicked: {e}")));
        }
    }
}

/// Run a blocking detector call on the worker pool.
async fn run_blocking<T, F>(label: &'static str, f: F) -> Result<T, DetectError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DetectError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DetectError::Execution(format!("{label} task failed: {e}")))?
}
