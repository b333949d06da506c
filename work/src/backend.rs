//! The contract every search strategy implements.

use std::sync::Arc;

use latticepow_types::Root;

use crate::{RaceContext, WorkError};

/// A compute backend that can race for a work value.
///
/// Implementations must:
/// - deliver at most once per call, and only a candidate they verified
///   against `difficulty`;
/// - poll [`RaceContext::is_cancelled`] at a bounded interval and stop
///   without delivering once it is raised;
/// - return from `generate_work` promptly, running the search on their own
///   threads. Callers observe completion only through the context.
///
/// An error returned from `generate_work` means the search never started.
pub trait WorkBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn generate_work(
        &self,
        ctx: &Arc<RaceContext>,
        root: &Root,
        difficulty: u64,
    ) -> Result<(), WorkError>;
}

/// Stand-in for a backend that is not available in this build.
///
/// Always reports [`WorkError::NotSupported`] and never delivers.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedBackend;

impl WorkBackend for UnsupportedBackend {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn generate_work(
        &self,
        _ctx: &Arc<RaceContext>,
        _root: &Root,
        _difficulty: u64,
    ) -> Result<(), WorkError> {
        Err(WorkError::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_never_delivers() {
        let ctx = Arc::new(RaceContext::new());
        let err = UnsupportedBackend
            .generate_work(&ctx, &Root::ZERO, 0)
            .unwrap_err();
        assert!(matches!(err, WorkError::NotSupported));
        assert_eq!(ctx.stats().attempts, 0);
    }
}
