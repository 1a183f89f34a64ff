//! Canonical GPU resolution.
//!
//! Combines the raw PCI record of each target GPU with the optional static
//! database match, the optional live name and the optional runtime snapshot.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{GpuRecord, PciDevice, SmiSnapshot};
use crate::ports::GpuDatabasePort;

/// Build one [`GpuRecord`] per target-vendor display controller, keeping
/// scan order. Non-target devices are skipped.
pub fn enrich_devices(
    devices: &[PciDevice],
    database: Option<&dyn GpuDatabasePort>,
    names: &HashMap<String, String>,
) -> Vec<GpuRecord> {
    devices
        .iter()
        .filter(|d| d.is_target_gpu())
        .map(|device| {
            let model = database.and_then(|db| db.lookup(&device.device_id));
            let resolved = resolve_name(names, &device.address);
            debug!(
                address = %device.address,
                device_id = %device.device_id,
                db_match = model.is_some(),
                live_name = resolved.is_some(),
                "Enriched GPU"
            );
            GpuRecord::new(device.clone())
                .with_model(model)
                .with_resolved_name(resolved)
        })
        .collect()
}

/// Look up a live name by exact address, then by normalized address.
pub fn resolve_name(names: &HashMap<String, String>, address: &str) -> Option<String> {
    if let Some(name) = names.get(address) {
        return Some(name.clone());
    }

    let wanted = normalize_address(address);
    names
        .iter()
        .find(|(key, _)| normalize_address(key) == wanted)
        .map(|(_, name)| name.clone())
}

/// Lowercase and strip the default `0000:` PCI domain.
pub fn normalize_address(address: &str) -> String {
    let lower = address.trim().to_ascii_lowercase();
    match lower.strip_prefix("0000:") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Attach runtime data by position: record `i` gets utility entry `i`.
///
/// This pairs by list index, not by bus address. If the PCI scan order and
/// the utility's enumeration order ever diverge, a record receives another
/// GPU's snapshot. Records beyond the utility's list are left untouched.
pub fn attach_runtime(gpus: &mut [GpuRecord], snapshot: &SmiSnapshot) {
    for (index, gpu) in gpus.iter_mut().enumerate() {
        if let Some(entry) = snapshot.gpus.get(index) {
            gpu.runtime = Some(entry.clone());
        }
    }
}
