//! Software accelerator device that evaluates batches on the calling thread.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use latticepow_crypto::work_digest;
use latticepow_types::Root;
use latticepow_work::{AcceleratorDevice, WorkError};

/// An [`AcceleratorDevice`] that hashes each batch on the CPU.
///
/// Optionally fails after a number of dispatches, to exercise device error
/// paths.
#[derive(Default)]
pub struct SoftwareDevice {
    dispatches: AtomicUsize,
    hashes: AtomicU64,
    fail_after: Option<usize>,
}

impl SoftwareDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return an error on dispatch number `n` (0-based) and after.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    pub fn dispatches(&self) -> usize {
        self.dispatches.load(Ordering::Acquire)
    }

    pub fn hashes(&self) -> u64 {
        self.hashes.load(Ordering::Acquire)
    }
}

impl AcceleratorDevice for SoftwareDevice {
    fn name(&self) -> &str {
        "software"
    }

    fn dispatch(
        &self,
        root: &Root,
        difficulty: u64,
        origin: u64,
        batch: u64,
    ) -> Result<Option<u64>, WorkError> {
        let round = self.dispatches.fetch_add(1, Ordering::AcqRel);
        if self.fail_after.is_some_and(|n| round >= n) {
            return Err(WorkError::Backend {
                backend: self.name().into(),
                reason: format!("dispatch {round} failed"),
            });
        }

        for offset in 0..batch {
            let candidate = origin.wrapping_add(offset);
            if work_digest(&candidate.to_le_bytes(), root) >= difficulty {
                self.hashes.fetch_add(offset + 1, Ordering::AcqRel);
                return Ok(Some(candidate));
            }
        }

        self.hashes.fetch_add(batch, Ordering::AcqRel);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_difficulty_returns_origin() {
        let device = SoftwareDevice::new();
        let found = device.dispatch(&Root::ZERO, 0, 500, 8).unwrap();
        assert_eq!(found, Some(500));
        assert_eq!(device.hashes(), 1);
    }

    #[test]
    fn impossible_difficulty_exhausts_batch() {
        let device = SoftwareDevice::new();
        let found = device.dispatch(&Root::ZERO, u64::MAX, 0, 64).unwrap();
        assert_eq!(found, None);
        assert_eq!(device.hashes(), 64);
    }

    #[test]
    fn fails_after_configured_dispatches() {
        let device = SoftwareDevice::failing_after(1);
        assert!(device.dispatch(&Root::ZERO, u64::MAX, 0, 1).is_ok());
        assert!(device.dispatch(&Root::ZERO, u64::MAX, 1, 1).is_err());
        assert_eq!(device.dispatches(), 2);
    }
}
