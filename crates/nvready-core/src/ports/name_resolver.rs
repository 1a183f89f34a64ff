//! Live display-name resolution capability.

use std::collections::HashMap;

use crate::context::DetectContext;

use super::DetectError;

/// Resolves marketing names from the host's live hardware name database.
#[cfg_attr(test, mockall::automock)]
pub trait NameResolverPort: Send + Sync {
    /// Map of bus address to display name. Addresses may or may not carry
    /// the PCI domain; the enrichment layer normalizes on lookup.
    fn resolve_names(&self, ctx: &DetectContext) -> Result<HashMap<String, String>, DetectError>;
}
