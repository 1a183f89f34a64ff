//! Core services - the detection and validation logic.
//!
//! This module contains the orchestrator and the pieces it composes. Services
//! here are pure orchestrators - they only know the capability ports, never
//! the concrete detectors.

mod driver_status;
mod enrichment;
mod orchestrator;
mod validation;

pub use driver_status::resolve_driver_status;
pub use enrichment::{attach_runtime, enrich_devices, normalize_address, resolve_name};
pub use orchestrator::Orchestrator;
pub use validation::{SystemValidator, ValidationPolicy};
