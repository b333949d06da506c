//! Fan a request out to several backends and keep the first result.

use std::num::NonZeroUsize;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use latticepow_types::{Difficulty, Root, Work};

use crate::accelerator::{discover_devices, AcceleratorBackend};
use crate::{CpuBackend, RaceContext, WorkBackend, WorkConfig, WorkError};

/// An ordered set of backends that race for every request.
#[derive(Clone, Default)]
pub struct Pool {
    backends: Vec<Arc<dyn WorkBackend>>,
}

/// A launched request. Dropping it cancels every backend still searching.
pub struct PendingWork {
    ctx: Arc<RaceContext>,
}

impl PendingWork {
    pub fn context(&self) -> &Arc<RaceContext> {
        &self.ctx
    }
}

impl Deref for PendingWork {
    type Target = RaceContext;

    fn deref(&self) -> &RaceContext {
        &self.ctx
    }
}

impl Drop for PendingWork {
    fn drop(&mut self) {
        self.ctx.cancel();
    }
}

/// Collects backends for a [`Pool`], dropping the ones that failed to build.
#[derive(Default)]
pub struct PoolBuilder {
    backends: Vec<Arc<dyn WorkBackend>>,
}

impl PoolBuilder {
    pub fn backend(mut self, backend: Arc<dyn WorkBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Add a backend if it was constructed; log and skip it otherwise.
    pub fn backend_result<B>(self, backend: Result<B, WorkError>) -> Self
    where
        B: WorkBackend + 'static,
    {
        match backend {
            Ok(b) => self.backend(Arc::new(b)),
            Err(e) => {
                tracing::warn!(error = %e, "backend unavailable, omitting from pool");
                self
            }
        }
    }

    pub fn build(self) -> Pool {
        Pool {
            backends: self.backends,
        }
    }
}

impl Pool {
    pub fn new(backends: Vec<Arc<dyn WorkBackend>>) -> Self {
        Self { backends }
    }

    pub fn builder() -> PoolBuilder {
        PoolBuilder::default()
    }

    /// Build the backends described by `config`.
    ///
    /// An accelerator is tried first. When one is found and the CPU thread
    /// count was not set explicitly, the CPU backend keeps half the
    /// available threads on machines with 8 or more and is left out below
    /// that. Fails with [`WorkError::NoDefaultPoolAvailable`] if nothing
    /// could be built.
    pub fn from_config(config: &WorkConfig) -> Result<Self, WorkError> {
        config.validate()?;

        let mut builder = Pool::builder();
        let mut accelerated = false;

        if config.enable_accelerator {
            let accelerator = discover_devices()
                .and_then(|devices| devices.into_iter().next().ok_or(WorkError::NoDeviceAvailable))
                .and_then(|device| AcceleratorBackend::with_batch(device, config.accelerator_batch));
            accelerated = accelerator.is_ok();
            builder = builder.backend_result(accelerator);
        }

        if config.enable_cpu {
            let threads = match config.cpu_threads {
                Some(n) => Some(n),
                None => {
                    let available = std::thread::available_parallelism()
                        .map(NonZeroUsize::get)
                        .unwrap_or(1);
                    match (accelerated, available) {
                        (false, n) => Some(n),
                        (true, n) if n >= 8 => Some(n / 2),
                        (true, _) => None,
                    }
                }
            };
            if let Some(threads) = threads {
                builder = builder.backend_result(CpuBackend::with_threads(threads));
            }
        }

        let pool = builder.build();
        if pool.is_empty() {
            return Err(WorkError::NoDefaultPoolAvailable);
        }

        tracing::debug!(backends = ?pool.backend_names(), "work pool ready");
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Race every backend for `root` and return the first valid work.
    pub fn generate_work(&self, root: &Root, difficulty: u64) -> Result<Work, WorkError> {
        let started = Instant::now();
        let ctx = self.launch(root, difficulty)?;
        let work = ctx.await_result()?;
        tracing::debug!(%root, %work, elapsed = ?started.elapsed(), "work generated");
        Ok(work)
    }

    /// Like [`generate_work`](Self::generate_work), giving up after `timeout`.
    pub fn generate_work_timeout(
        &self,
        root: &Root,
        difficulty: u64,
        timeout: Duration,
    ) -> Result<Work, WorkError> {
        let ctx = self.launch(root, difficulty)?;
        ctx.await_result_timeout(timeout)
    }

    /// Start every backend on a fresh context.
    ///
    /// All backends are registered as racers before any is launched, so an
    /// early failure cannot be mistaken for the whole pool failing. The
    /// search stops when the returned handle is dropped.
    pub fn launch(&self, root: &Root, difficulty: u64) -> Result<PendingWork, WorkError> {
        if self.backends.is_empty() {
            return Err(WorkError::EmptyPool);
        }

        let ctx = Arc::new(RaceContext::new());
        for _ in &self.backends {
            ctx.register_racer();
        }

        tracing::debug!(
            backends = self.backends.len(),
            difficulty = %Difficulty::new(difficulty),
            "racing backends"
        );

        for backend in &self.backends {
            if let Err(e) = backend.generate_work(&ctx, root, difficulty) {
                tracing::warn!(backend = backend.name(), error = %e, "backend failed to start");
                ctx.report_failure(&e);
            }
        }

        Ok(PendingWork { ctx })
    }
}

static DEFAULT_POOL: OnceLock<Option<Pool>> = OnceLock::new();

/// The process-wide pool, built from [`WorkConfig::default`] on first use.
///
/// Prefer constructing a [`Pool`] explicitly; this exists for callers that
/// just want work without wiring backends.
pub fn default_pool() -> Result<&'static Pool, WorkError> {
    DEFAULT_POOL
        .get_or_init(|| match Pool::from_config(&WorkConfig::default()) {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!(error = %e, "no default work pool");
                None
            }
        })
        .as_ref()
        .ok_or(WorkError::NoDefaultPoolAvailable)
}

/// Generate work with the process-wide default pool.
pub fn generate_work(root: &Root, difficulty: u64) -> Result<Work, WorkError> {
    default_pool()?.generate_work(root, difficulty)
}
