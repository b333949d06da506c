//! Nullable backends: scripted deliveries and scripted failures.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use latticepow_types::Root;
use latticepow_work::{RaceContext, WorkBackend, WorkError};

#[derive(Default)]
struct Counters {
    launches: AtomicUsize,
    accepted: AtomicUsize,
    polls_after_cancel: AtomicUsize,
    stopped: AtomicBool,
}

/// A backend that delivers a fixed list of nonces.
///
/// Each launch spawns a thread that waits `delay`, then offers every
/// scripted nonce in order (checking cancellation before each one). With
/// an empty script it just spins on the cancellation signal until raised.
/// Nonces are delivered as given, without checking them against the
/// difficulty.
#[derive(Clone)]
pub struct NullBackend {
    nonces: Vec<u64>,
    delay: Duration,
    counters: Arc<Counters>,
}

impl NullBackend {
    pub fn new(nonces: Vec<u64>) -> Self {
        Self {
            nonces,
            delay: Duration::ZERO,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Deliver a single nonce.
    pub fn delivering(nonce: u64) -> Self {
        Self::new(vec![nonce])
    }

    /// Never deliver; run until cancelled.
    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of `generate_work` calls.
    pub fn launches(&self) -> usize {
        self.counters.launches.load(Ordering::Acquire)
    }

    /// Deliveries the context accepted from this backend.
    pub fn accepted(&self) -> usize {
        self.counters.accepted.load(Ordering::Acquire)
    }

    /// Whether the most recent search thread has exited.
    pub fn stopped(&self) -> bool {
        self.counters.stopped.load(Ordering::Acquire)
    }

    /// Cancellation polls that happened after the signal was already
    /// raised. Stays at most one per launch for a well-behaved loop.
    pub fn polls_after_cancel(&self) -> usize {
        self.counters.polls_after_cancel.load(Ordering::Acquire)
    }
}

impl WorkBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn generate_work(
        &self,
        ctx: &Arc<RaceContext>,
        _root: &Root,
        _difficulty: u64,
    ) -> Result<(), WorkError> {
        self.counters.launches.fetch_add(1, Ordering::AcqRel);
        self.counters.stopped.store(false, Ordering::Release);

        let ctx = Arc::clone(ctx);
        let nonces = self.nonces.clone();
        let delay = self.delay;
        let counters = Arc::clone(&self.counters);

        thread::spawn(move || {
            if !delay.is_zero() {
                thread::sleep(delay);
            }

            let cancelled = || {
                let c = ctx.is_cancelled();
                if c {
                    counters.polls_after_cancel.fetch_add(1, Ordering::AcqRel);
                }
                c
            };

            if nonces.is_empty() {
                while !cancelled() {
                    thread::sleep(Duration::from_millis(1));
                }
            }

            for nonce in nonces {
                if cancelled() {
                    break;
                }
                if ctx.deliver(nonce) {
                    counters.accepted.fetch_add(1, Ordering::AcqRel);
                }
            }

            counters.stopped.store(true, Ordering::Release);
        });

        Ok(())
    }
}

/// A backend that refuses to start.
#[derive(Clone, Debug)]
pub struct FailingBackend {
    reason: String,
}

impl FailingBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl WorkBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn generate_work(
        &self,
        _ctx: &Arc<RaceContext>,
        _root: &Root,
        _difficulty: u64,
    ) -> Result<(), WorkError> {
        Err(WorkError::Backend {
            backend: self.name().into(),
            reason: self.reason.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_scripted_nonce() {
        let backend = NullBackend::delivering(77);
        let ctx = Arc::new(RaceContext::new());
        backend.generate_work(&ctx, &Root::ZERO, 0).unwrap();
        assert_eq!(ctx.await_result().unwrap().nonce(), 77);
        assert_eq!(backend.launches(), 1);
    }

    #[test]
    fn silent_backend_stops_on_cancel() {
        let backend = NullBackend::silent();
        let ctx = Arc::new(RaceContext::new());
        backend.generate_work(&ctx, &Root::ZERO, 0).unwrap();
        ctx.cancel();
        while !backend.stopped() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(backend.polls_after_cancel(), 1);
        assert_eq!(ctx.stats().attempts, 0);
    }

    #[test]
    fn failing_backend_reports_reason() {
        let err = FailingBackend::new("device lost")
            .generate_work(&Arc::new(RaceContext::new()), &Root::ZERO, 0)
            .unwrap_err();
        assert_eq!(err.to_string(), "backend failing failed: device lost");
    }
}
