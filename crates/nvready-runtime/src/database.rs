//! Built-in table of NVIDIA GPU models keyed by PCI device id.

use nvready_core::GpuModel;
use nvready_core::ports::GpuDatabasePort;

struct Entry {
    device_id: &'static str,
    name: &'static str,
    architecture: &'static str,
    min_driver_version: &'static str,
    compute_capability: &'static str,
    memory_mb: u64,
    is_datacenter: bool,
}

const fn gpu(
    device_id: &'static str,
    name: &'static str,
    architecture: &'static str,
    min_driver_version: &'static str,
    compute_capability: &'static str,
    memory_mb: u64,
) -> Entry {
    Entry {
        device_id,
        name,
        architecture,
        min_driver_version,
        compute_capability,
        memory_mb,
        is_datacenter: false,
    }
}

const fn datacenter(entry: Entry) -> Entry {
    Entry {
        is_datacenter: true,
        ..entry
    }
}

#[rustfmt::skip]
const MODELS: &[Entry] = &[
    // Pascal
    gpu("1b06", "GeForce GTX 1080 Ti", "Pascal", "378.13", "6.1", 11264),
    gpu("1b80", "GeForce GTX 1080", "Pascal", "367.27", "6.1", 8192),
    gpu("1b81", "GeForce GTX 1070", "Pascal", "367.27", "6.1", 8192),
    gpu("1c03", "GeForce GTX 1060 6GB", "Pascal", "367.35", "6.1", 6144),
    gpu("1c82", "GeForce GTX 1050 Ti", "Pascal", "375.26", "6.1", 4096),
    datacenter(gpu("15f8", "Tesla P100 PCIe 16GB", "Pascal", "375.20", "6.0", 16384)),
    datacenter(gpu("1b38", "Tesla P40", "Pascal", "375.20", "6.1", 24576)),
    // Volta
    gpu("1d81", "TITAN V", "Volta", "387.34", "7.0", 12288),
    datacenter(gpu("1db4", "Tesla V100 PCIe 16GB", "Volta", "384.81", "7.0", 16384)),
    datacenter(gpu("1db6", "Tesla V100 PCIe 32GB", "Volta", "396.26", "7.0", 32768)),
    // Turing
    gpu("1e07", "GeForce RTX 2080 Ti", "Turing", "410.48", "7.5", 11264),
    gpu("1e87", "GeForce RTX 2080", "Turing", "410.48", "7.5", 8192),
    gpu("1f02", "GeForce RTX 2070", "Turing", "410.66", "7.5", 8192),
    gpu("1f08", "GeForce RTX 2060", "Turing", "415.25", "7.5", 6144),
    gpu("2182", "GeForce GTX 1660 Ti", "Turing", "418.43", "7.5", 6144),
    datacenter(gpu("1eb8", "Tesla T4", "Turing", "410.79", "7.5", 15360)),
    // Ampere
    gpu("2204", "GeForce RTX 3090", "Ampere", "455.23", "8.6", 24576),
    gpu("2206", "GeForce RTX 3080", "Ampere", "455.23", "8.6", 10240),
    gpu("2484", "GeForce RTX 3070", "Ampere", "455.38", "8.6", 8192),
    gpu("2503", "GeForce RTX 3060", "Ampere", "460.39", "8.6", 12288),
    datacenter(gpu("20b0", "A100-SXM4-40GB", "Ampere", "450.36.06", "8.0", 40960)),
    datacenter(gpu("20b5", "A100 80GB PCIe", "Ampere", "460.73.01", "8.0", 81920)),
    datacenter(gpu("2236", "A10", "Ampere", "460.73.01", "8.6", 24576)),
    // Ada Lovelace
    gpu("2684", "GeForce RTX 4090", "Ada Lovelace", "520.56.06", "8.9", 24576),
    gpu("2704", "GeForce RTX 4080", "Ada Lovelace", "525.60.11", "8.9", 16384),
    gpu("2782", "GeForce RTX 4070 Ti", "Ada Lovelace", "525.78.01", "8.9", 12288),
    gpu("2786", "GeForce RTX 4070", "Ada Lovelace", "530.41.03", "8.9", 12288),
    gpu("2803", "GeForce RTX 4060 Ti", "Ada Lovelace", "535.43.02", "8.9", 8192),
    datacenter(gpu("26b9", "L40S", "Ada Lovelace", "535.54.03", "8.9", 49152)),
    datacenter(gpu("27b8", "L4", "Ada Lovelace", "525.60.13", "8.9", 24576)),
    // Hopper
    datacenter(gpu("2330", "H100 SXM5 80GB", "Hopper", "525.60.13", "9.0", 81920)),
    datacenter(gpu("2331", "H100 PCIe", "Hopper", "525.60.13", "9.0", 81920)),
    // Blackwell
    gpu("2b85", "GeForce RTX 5090", "Blackwell", "570.86.16", "12.0", 32768),
    gpu("2c02", "GeForce RTX 5080", "Blackwell", "570.86.16", "12.0", 16384),
    datacenter(gpu("2901", "B200", "Blackwell", "570.124.06", "10.0", 184_320)),
];

/// Static device-id lookup. Stateless, so any number of callers may share it.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticGpuDatabase;

impl StaticGpuDatabase {
    pub const fn new() -> Self {
        Self
    }

    pub const fn len(&self) -> usize {
        MODELS.len()
    }

    pub const fn is_empty(&self) -> bool {
        MODELS.is_empty()
    }

    /// Distinct architectures, oldest first.
    pub fn architectures(&self) -> Vec<&'static str> {
        let mut seen: Vec<&'static str> = Vec::new();
        for entry in MODELS {
            if !seen.contains(&entry.architecture) {
                seen.push(entry.architecture);
            }
        }
        seen
    }
}

impl GpuDatabasePort for StaticGpuDatabase {
    fn lookup(&self, device_id: &str) -> Option<GpuModel> {
        let wanted = nvready_core::domain::normalize_hex_id(device_id);
        MODELS
            .iter()
            .find(|entry| entry.device_id == wanted)
            .map(|entry| GpuModel {
                device_id: entry.device_id.to_string(),
                name: entry.name.to_string(),
                architecture: entry.architecture.to_string(),
                min_driver_version: entry.min_driver_version.to_string(),
                compute_capability: entry.compute_capability.to_string(),
                memory_mb: entry.memory_mb,
                is_datacenter: entry.is_datacenter,
            })
    }
}
