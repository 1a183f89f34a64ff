//! `nvidia-smi` driver utility adapter.

use std::io;
use std::str::FromStr;
use std::sync::Arc;

use nvready_core::ports::{DriverUtilityPort, SmiError};
use nvready_core::{DetectContext, SmiGpu, SmiSnapshot};
use regex::Regex;
use tracing::debug;

use crate::command::CommandRunner;

pub const NVIDIA_SMI: &str = "nvidia-smi";

const QUERY_FIELDS: &str = "index,name,pci.bus_id,driver_version,memory.total,memory.used,\
                            memory.free,temperature.gpu,utilization.gpu,utilization.memory,\
                            power.draw,power.limit";
const FIELD_COUNT: usize = 12;

const DRIVER_NOT_LOADED: &str = "couldn't communicate with the NVIDIA driver";
const NO_DEVICES: &str = "No devices were found";

pub struct NvidiaSmi {
    runner: Arc<dyn CommandRunner>,
}

impl NvidiaSmi {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Run `nvidia-smi` and classify failures. Returns stdout on success.
    fn run(&self, ctx: &DetectContext, args: &[&str]) -> Result<String, SmiError> {
        ctx.check()?;
        let output = self.runner.run(NVIDIA_SMI, args).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                SmiError::NotFound
            } else {
                SmiError::Execution(e.to_string())
            }
        })?;

        let combined = output.combined();
        if combined.contains(DRIVER_NOT_LOADED) {
            return Err(SmiError::DriverNotLoaded);
        }
        if combined.contains(NO_DEVICES) {
            return Err(SmiError::NoDevices);
        }
        if !output.success {
            let detail = combined
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("exited with an error");
            return Err(SmiError::Execution(detail.to_string()));
        }
        Ok(output.stdout)
    }
}

impl DriverUtilityPort for NvidiaSmi {
    fn is_available(&self) -> bool {
        self.runner.exists(NVIDIA_SMI)
    }

    fn parse(&self, ctx: &DetectContext) -> Result<SmiSnapshot, SmiError> {
        let query = format!("--query-gpu={QUERY_FIELDS}");
        let csv = self.run(ctx, &[&query, "--format=csv,noheader,nounits"])?;
        let (driver_version, gpus) = parse_query_csv(&csv)?;

        let cuda_version = match self.get_cuda_version(ctx) {
            Ok(version) => version,
            Err(SmiError::Cancelled(reason)) => return Err(SmiError::Cancelled(reason)),
            Err(e) => {
                debug!(error = %e, "CUDA version not reported");
                String::new()
            }
        };

        debug!(gpus = gpus.len(), driver = %driver_version, "nvidia-smi parsed");
        Ok(SmiSnapshot {
            driver_version,
            cuda_version,
            gpus,
        })
    }

    fn get_driver_version(&self, ctx: &DetectContext) -> Result<String, SmiError> {
        let stdout = self.run(ctx, &["--query-gpu=driver_version", "--format=csv,noheader"])?;
        stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(ToString::to_string)
            .ok_or(SmiError::NoDevices)
    }

    fn get_cuda_version(&self, ctx: &DetectContext) -> Result<String, SmiError> {
        let banner = self.run(ctx, &[])?;
        parse_cuda_version(&banner)?
            .ok_or_else(|| SmiError::Execution("CUDA version missing from banner".to_string()))
    }
}

/// Parse `--format=csv,noheader,nounits` rows. Returns the driver version
/// of the first row alongside every GPU.
pub fn parse_query_csv(csv: &str) -> Result<(String, Vec<SmiGpu>), SmiError> {
    let mut driver_version = String::new();
    let mut gpus = Vec::new();

    for line in csv.lines().filter(|l| !l.trim().is_empty()) {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Err(SmiError::Execution(format!(
                "expected {FIELD_COUNT} fields, got {}: {line}",
                fields.len()
            )));
        }

        let index = fields[0]
            .parse()
            .map_err(|_| SmiError::Execution(format!("invalid GPU index '{}'", fields[0])))?;
        if driver_version.is_empty() {
            driver_version = fields[3].to_string();
        }

        gpus.push(SmiGpu {
            index,
            name: fields[1].to_string(),
            pci_bus_id: fields[2].to_string(),
            memory_total_mb: optional(fields[4]),
            memory_used_mb: optional(fields[5]),
            memory_free_mb: optional(fields[6]),
            temperature_c: optional(fields[7]),
            utilization_gpu_pct: optional(fields[8]),
            utilization_memory_pct: optional(fields[9]),
            power_draw_w: optional(fields[10]),
            power_limit_w: optional(fields[11]),
        });
    }

    if gpus.is_empty() {
        return Err(SmiError::NoDevices);
    }
    Ok((driver_version, gpus))
}

/// Extract `CUDA Version: 12.4` from the plain `nvidia-smi` banner.
pub fn parse_cuda_version(banner: &str) -> Result<Option<String>, SmiError> {
    let re = Regex::new(r"CUDA Version:\s*([0-9]+(?:\.[0-9]+)*)")
        .map_err(|e| SmiError::Execution(e.to_string()))?;
    Ok(re
        .captures(banner)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string()))
}

/// `[N/A]`, `[Not Supported]` and anything unparsable become `None`.
fn optional<T: FromStr>(field: &str) -> Option<T> {
    if field.starts_with('[') {
        return None;
    }
    field.parse().ok()
}
