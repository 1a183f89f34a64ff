//! GPU records, database models and driver-utility snapshots.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::pci::{PciDevice, TARGET_VENDOR_NAME};

/// Architecture reported when no database match exists.
pub const UNKNOWN_ARCHITECTURE: &str = "unknown";

/// Static database entry for a known GPU model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuModel {
    /// PCI device id (lowercase hex).
    pub device_id: String,
    pub name: String,
    /// Architecture family, e.g. "Ada Lovelace".
    pub architecture: String,
    /// Oldest driver branch that supports this model.
    pub min_driver_version: String,
    pub compute_capability: String,
    pub memory_mb: u64,
    pub is_datacenter: bool,
}

/// Per-GPU runtime data reported by the driver utility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmiGpu {
    pub index: u32,
    pub name: String,
    pub pci_bus_id: String,
    pub memory_total_mb: Option<u64>,
    pub memory_used_mb: Option<u64>,
    pub memory_free_mb: Option<u64>,
    pub temperature_c: Option<u32>,
    pub utilization_gpu_pct: Option<u32>,
    pub utilization_memory_pct: Option<u32>,
    pub power_draw_w: Option<f64>,
    pub power_limit_w: Option<f64>,
}

/// One full run of the driver utility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmiSnapshot {
    pub driver_version: String,
    pub cuda_version: String,
    /// GPUs in the utility's own enumeration order.
    pub gpus: Vec<SmiGpu>,
}

/// One physical GPU after enrichment.
///
/// The display name and architecture are derived on demand from the
/// attached sources rather than stored.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuRecord {
    pub device: PciDevice,
    /// Static database match, if the device id is known.
    pub model: Option<GpuModel>,
    /// Name from the live hardware name database (lspci).
    pub resolved_name: Option<String>,
    /// Runtime snapshot from the driver utility, matched by position.
    pub runtime: Option<SmiGpu>,
}

impl GpuRecord {
    pub fn new(device: PciDevice) -> Self {
        Self {
            device,
            model: None,
            resolved_name: None,
            runtime: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: Option<GpuModel>) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_resolved_name(mut self, name: Option<String>) -> Self {
        self.resolved_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    /// Display name; first non-empty of live name, database model name,
    /// utility name, then a synthesized fallback. Never empty.
    pub fn canonical_name(&self) -> String {
        let candidates = [
            self.resolved_name.as_deref(),
            self.model.as_ref().map(|m| m.name.as_str()),
            self.runtime.as_ref().map(|r| r.name.as_str()),
        ];

        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map_or_else(|| self.fallback_name(), str::to_string)
    }

    /// Architecture family from the database match only.
    pub fn architecture(&self) -> &str {
        self.model
            .as_ref()
            .map_or(UNKNOWN_ARCHITECTURE, |m| m.architecture.as_str())
    }

    pub fn address(&self) -> &str {
        &self.device.address
    }

    fn fallback_name(&self) -> String {
        format!(
            "{TARGET_VENDOR_NAME} GPU (Device ID: {})",
            self.device.device_id
        )
    }
}

impl Serialize for GpuRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GpuRecord", 9)?;
        state.serialize_field("name", &self.canonical_name())?;
        state.serialize_field("architecture", self.architecture())?;
        state.serialize_field("address", &self.device.address)?;
        state.serialize_field("vendor_id", &self.device.vendor_id)?;
        state.serialize_field("device_id", &self.device.device_id)?;
        state.serialize_field("class", &self.device.class)?;
        state.serialize_field("driver", &self.device.driver)?;
        state.serialize_field("model", &self.model)?;
        state.serialize_field("runtime", &self.runtime)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> GpuRecord {
        GpuRecord::new(PciDevice::new("0000:01:00.0", "10de", "2684", "030000", ""))
    }

    fn model(name: &str) -> GpuModel {
        GpuModel {
            device_id: "2684".to_string(),
            name: name.to_string(),
            architecture: "Ada Lovelace".to_string(),
            min_driver_version: "520.56.06".to_string(),
            compute_capability: "8.9".to_string(),
            memory_mb: 24576,
            is_datacenter: false,
        }
    }

    #[test]
    fn test_fallback_name_contains_device_id() {
        let gpu = record();
        assert_eq!(gpu.canonical_name(), "NVIDIA GPU (Device ID: 2684)");
        assert_eq!(gpu.architecture(), UNKNOWN_ARCHITECTURE);
    }

    #[test]
    fn test_resolved_name_wins_over_database() {
        let gpu = record()
            .with_model(Some(model("GeForce RTX 4090")))
            .with_resolved_name(Some("AD102 [GeForce RTX 4090 D]".to_string()));
        assert_eq!(gpu.canonical_name(), "AD102 [GeForce RTX 4090 D]");
        assert_eq!(gpu.architecture(), "Ada Lovelace");
    }

    #[test]
    fn test_runtime_name_used_after_database() {
        let mut gpu = record();
        gpu.runtime = Some(SmiGpu {
            name: "NVIDIA GeForce RTX 4090".to_string(),
            ..SmiGpu::default()
        });
        assert_eq!(gpu.canonical_name(), "NVIDIA GeForce RTX 4090");

        let gpu = gpu.with_model(Some(model("GeForce RTX 4090")));
        assert_eq!(gpu.canonical_name(), "GeForce RTX 4090");
    }

    #[test]
    fn test_blank_sources_are_skipped() {
        let mut gpu = record()
            .with_model(Some(model("  ")))
            .with_resolved_name(Some(String::new()));
        gpu.runtime = Some(SmiGpu::default());
        assert!(gpu.resolved_name.is_none());
        assert_eq!(gpu.canonical_name(), "NVIDIA GPU (Device ID: 2684)");
    }

    #[test]
    fn test_serialized_record_includes_derived_fields() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["name"], "NVIDIA GPU (Device ID: 2684)");
        assert_eq!(json["architecture"], "unknown");
        assert!(json["model"].is_null());
    }

    #[test]
    fn test_serialized_record_carries_hardware_identity() {
        let json = serde_json::to_value(record()).unwrap();
        let fields = json.as_object().unwrap();
        assert_eq!(fields.len(), 9);
        assert_eq!(json["class"], "030000");
        assert_eq!(json["vendor_id"], "10de");
        assert_eq!(json["driver"], "");
    }
}
