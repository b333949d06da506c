//! Batched accelerator backend.
//!
//! The device itself (queues, buffers, kernels) sits behind
//! [`AcceleratorDevice`]. This module owns the dispatch loop: evaluate a
//! power-of-two batch of consecutive candidates per round, advance the
//! origin by the batch size, and re-check cancellation between rounds.

use std::sync::Arc;
use std::thread;

use latticepow_types::{Difficulty, Root};

use crate::validator::is_valid_nonce;
use crate::{RaceContext, WorkBackend, WorkError};

/// Candidates evaluated per dispatch round by default.
pub const DEFAULT_BATCH: u64 = 1 << 23;

/// A compute device able to evaluate a batch of candidates.
pub trait AcceleratorDevice: Send + Sync {
    fn name(&self) -> &str;

    /// Evaluate `batch` candidates starting at `origin` (wrapping) and
    /// return one that meets `difficulty`, if any. Blocks until the device
    /// finishes the round.
    fn dispatch(
        &self,
        root: &Root,
        difficulty: u64,
        origin: u64,
        batch: u64,
    ) -> Result<Option<u64>, WorkError>;
}

/// Find accelerator devices usable for work generation.
///
/// No compute kernels are compiled into this build, so discovery always
/// reports [`WorkError::NoDeviceAvailable`]. Devices implemented outside
/// this crate can be handed to [`AcceleratorBackend::new`] directly.
pub fn discover_devices() -> Result<Vec<Arc<dyn AcceleratorDevice>>, WorkError> {
    Err(WorkError::NoDeviceAvailable)
}

/// Drives an [`AcceleratorDevice`] on a dedicated thread per request.
pub struct AcceleratorBackend {
    device: Arc<dyn AcceleratorDevice>,
    batch: u64,
}

impl AcceleratorBackend {
    pub fn new(device: Arc<dyn AcceleratorDevice>) -> Self {
        Self {
            device,
            batch: DEFAULT_BATCH,
        }
    }

    /// Use a custom batch size. Must be a non-zero power of two.
    pub fn with_batch(device: Arc<dyn AcceleratorDevice>, batch: u64) -> Result<Self, WorkError> {
        if !batch.is_power_of_two() {
            return Err(WorkError::Config(format!(
                "accelerator batch must be a power of two, got {batch}"
            )));
        }
        Ok(Self { device, batch })
    }

    /// First available device, if discovery finds one.
    pub fn discover() -> Result<Self, WorkError> {
        let device = discover_devices()?
            .into_iter()
            .next()
            .ok_or(WorkError::NoDeviceAvailable)?;
        Ok(Self::new(device))
    }

    pub fn batch(&self) -> u64 {
        self.batch
    }

    pub fn device_name(&self) -> &str {
        self.device.name()
    }
}

impl WorkBackend for AcceleratorBackend {
    fn name(&self) -> &'static str {
        "accelerator"
    }

    fn generate_work(
        &self,
        ctx: &Arc<RaceContext>,
        root: &Root,
        difficulty: u64,
    ) -> Result<(), WorkError> {
        let ctx = Arc::clone(ctx);
        let device = Arc::clone(&self.device);
        let root = *root;
        let batch = self.batch;

        tracing::debug!(
            backend = self.name(),
            device = device.name(),
            batch,
            difficulty = %Difficulty::new(difficulty),
            "launching accelerator search"
        );

        thread::Builder::new()
            .name(format!("work-accel-{}", device.name()))
            .spawn(move || {
                if let Err(e) = dispatch_loop(&ctx, device.as_ref(), &root, difficulty, batch) {
                    tracing::warn!(device = device.name(), error = %e, "accelerator search failed");
                    ctx.report_failure(&e);
                }
            })
            .map_err(|e| WorkError::Backend {
                backend: self.name().into(),
                reason: e.to_string(),
            })?;

        Ok(())
    }
}

fn dispatch_loop(
    ctx: &RaceContext,
    device: &dyn AcceleratorDevice,
    root: &Root,
    difficulty: u64,
    batch: u64,
) -> Result<(), WorkError> {
    let mut origin = 0u64;

    loop {
        if ctx.is_cancelled() {
            return Ok(());
        }

        if let Some(candidate) = device.dispatch(root, difficulty, origin, batch)? {
            if is_valid_nonce(root, difficulty, candidate) {
                ctx.deliver(candidate);
                return Ok(());
            }
            tracing::warn!(
                device = device.name(),
                candidate,
                "device returned a candidate below difficulty, discarding"
            );
        }

        origin = origin.wrapping_add(batch);
    }
}
