//! Multi-threaded CPU backend.
//!
//! The nonce space above `2^32` is split into one window per thread; thread
//! `i` of `T` starts at `2^32 + (2^32 / T) * i` and counts upwards
//! (wrapping), so no two threads test the same candidate. The low range is
//! left alone for fixtures.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use latticepow_crypto::work_digest;
use latticepow_types::{Difficulty, Root};
use rayon::ThreadPoolBuilder;

use crate::{RaceContext, WorkBackend, WorkError};

const PARTITION_BASE: u64 = 1 << 32;
const PARTITION_SPAN: u64 = 1 << 32;

/// First candidate of partition `index` out of `partitions`.
pub fn partition_start(index: u64, partitions: u64) -> u64 {
    PARTITION_BASE + (PARTITION_SPAN / partitions.max(1)) * index
}

/// Generates proof-of-work with `T` partitions per request.
///
/// Each request gets its own rayon pool, so concurrent requests search side
/// by side instead of queueing. The pool's threads exit once every
/// partition has stopped.
pub struct CpuBackend {
    threads: usize,
    active: Arc<AtomicUsize>,
}

impl CpuBackend {
    /// One thread per available processing unit.
    pub fn new() -> Result<Self, WorkError> {
        let threads = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::with_threads(threads)
    }

    pub fn with_threads(threads: usize) -> Result<Self, WorkError> {
        if threads == 0 {
            return Err(WorkError::Config(
                "cpu backend needs at least one thread".into(),
            ));
        }

        tracing::debug!(threads, "cpu backend ready");

        Ok(Self {
            threads,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Partitions still searching, across every request on this backend.
    pub fn active_partitions(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

impl WorkBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    /// Launch every partition and return immediately.
    ///
    /// Partitions run until `ctx` is cancelled or one of them delivers.
    fn generate_work(
        &self,
        ctx: &Arc<RaceContext>,
        root: &Root,
        difficulty: u64,
    ) -> Result<(), WorkError> {
        let partitions = self.threads as u64;
        tracing::debug!(
            backend = self.name(),
            partitions,
            %root,
            difficulty = %Difficulty::new(difficulty),
            "launching cpu search"
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("work-cpu-{i}"))
            .build()
            .map_err(|e| WorkError::Backend {
                backend: self.name().into(),
                reason: e.to_string(),
            })?;

        // Spawned jobs keep the pool's threads alive after `pool` is dropped.
        for index in 0..partitions {
            let ctx = Arc::clone(ctx);
            let root = *root;
            let active = Arc::clone(&self.active);
            let start = partition_start(index, partitions);

            active.fetch_add(1, Ordering::AcqRel);
            pool.spawn(move || {
                let hashes = search_partition(&ctx, &root, difficulty, start);
                active.fetch_sub(1, Ordering::AcqRel);
                tracing::trace!(partition = index, hashes, "partition stopped");
            });
        }

        Ok(())
    }
}

/// Scan upwards from `start` until a candidate meets `difficulty` or the
/// context is cancelled. Returns the number of hashes computed.
fn search_partition(ctx: &RaceContext, root: &Root, difficulty: u64, start: u64) -> u64 {
    let mut candidate = start;
    let mut hashes = 0u64;

    loop {
        if ctx.is_cancelled() {
            return hashes;
        }

        hashes += 1;
        if work_digest(&candidate.to_le_bytes(), root) >= difficulty {
            if ctx.deliver(candidate) {
                tracing::debug!(candidate, hashes, "cpu partition found work");
            }
            return hashes;
        }

        candidate = candidate.wrapping_add(1);
    }
}
