//! Deadline and cancellation shared by one orchestrator call.
//!
//! A `DetectContext` is created once at the top of an operation and cloned
//! into every branch. Detectors call [`DetectContext::check`] at call
//! boundaries and once per item of a multi-item scan; blocking syscalls
//! themselves are never interrupted.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::ports::DetectError;

#[derive(Debug, Clone, Default)]
pub struct DetectContext {
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl DetectContext {
    /// A context with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            token: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token (e.g. wired to Ctrl-C).
    #[must_use]
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fail with [`DetectError::Cancelled`] if the context is done.
    pub fn check(&self) -> Result<(), DetectError> {
        if self.token.is_cancelled() {
            return Err(DetectError::Cancelled("operation was cancelled".to_string()));
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(DetectError::Cancelled("deadline exceeded".to_string()));
        }
        Ok(())
    }

    /// Resolves once the token is cancelled or the deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.token.cancelled() => {}
                    () = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_is_live() {
        let ctx = DetectContext::new();
        assert!(ctx.check().is_ok());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let ctx = DetectContext::new();
        let branch = ctx.clone();
        ctx.cancel();
        assert!(branch.is_cancelled());
        assert!(matches!(branch.check(), Err(DetectError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_expired_deadline_cancels() {
        let ctx = DetectContext::with_timeout(Duration::ZERO);
        assert!(ctx.is_cancelled());
        let err = ctx.check().unwrap_err();
        assert!(err.is_cancelled());
        assert!(err.to_string().contains("deadline exceeded"));
        // done() must resolve immediately
        ctx.done().await;
    }
}
