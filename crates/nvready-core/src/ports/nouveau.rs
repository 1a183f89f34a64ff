//! Nouveau status capability.

use crate::context::DetectContext;
use crate::domain::NouveauStatus;

use super::DetectError;

#[cfg_attr(test, mockall::automock)]
pub trait NouveauPort: Send + Sync {
    fn detect(&self, ctx: &DetectContext) -> Result<NouveauStatus, DetectError>;
}
