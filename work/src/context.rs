//! Per-request race coordination between competing backends.
//!
//! Every backend racing for one request shares a single [`RaceContext`].
//! The first verified delivery wins; the waiter then cancels the context,
//! which every search loop observes through a lock-free flag and exits.
//!
//! Writers (`deliver`, `cancel`, `report_failure`) serialise on one mutex so
//! a delivery racing with cancellation either lands before the context is
//! closed or is dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use latticepow_types::Work;

use crate::WorkError;

/// Delivery counters for a context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Calls to [`RaceContext::deliver`].
    pub attempts: u64,
    /// Deliveries that were stored as the result. Never more than one.
    pub accepted: u64,
}

#[derive(Default)]
struct RaceState {
    result: Option<u64>,
    closed: bool,
    racers: usize,
    failed: usize,
    last_failure: Option<String>,
    accepted: u64,
}

/// Shared result slot and cancellation signal for one work request.
pub struct RaceContext {
    state: Mutex<RaceState>,
    ready: Condvar,
    cancelled: AtomicBool,
    attempts: AtomicU64,
}

impl Default for RaceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RaceContext {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RaceState::default()),
            ready: Condvar::new(),
            cancelled: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offer a verified search candidate (little-endian search form).
    ///
    /// Returns `true` if this delivery became the result. Deliveries after
    /// the first, or after cancellation, are discarded.
    pub fn deliver(&self, nonce: u64) -> bool {
        self.attempts.fetch_add(1, Ordering::Relaxed);

        let mut state = self.lock();
        if state.closed || state.result.is_some() {
            return false;
        }
        state.result = Some(nonce);
        state.accepted += 1;
        drop(state);

        self.ready.notify_all();
        true
    }

    /// Whether the context has been cancelled. Search loops poll this.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Close the context and raise the cancellation signal.
    ///
    /// Irreversible and idempotent. Any result not yet taken is discarded.
    pub fn cancel(&self) {
        let mut state = self.lock();
        self.close(&mut state);
        drop(state);

        self.ready.notify_all();
    }

    fn close(&self, state: &mut RaceState) {
        state.closed = true;
        state.result = None;
        self.cancelled.store(true, Ordering::Release);
    }

    /// Count one more backend as racing on this context.
    ///
    /// Only registered racers are considered when deciding that every
    /// backend has failed.
    pub fn register_racer(&self) {
        self.lock().racers += 1;
    }

    /// Record that a registered racer gave up without a result.
    pub fn report_failure(&self, error: &WorkError) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.failed += 1;
        state.last_failure = Some(error.to_string());
        drop(state);

        self.ready.notify_all();
    }

    /// Block until a result is delivered, then cancel every other racer.
    pub fn await_result(&self) -> Result<Work, WorkError> {
        self.wait(None)
    }

    /// Like [`await_result`](Self::await_result), but cancel and give up
    /// after `timeout`.
    pub fn await_result_timeout(&self, timeout: Duration) -> Result<Work, WorkError> {
        self.wait(Some(timeout))
    }

    fn wait(&self, timeout: Option<Duration>) -> Result<Work, WorkError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.lock();

        loop {
            if let Some(nonce) = state.result.take() {
                self.close(&mut state);
                drop(state);
                self.ready.notify_all();
                return Ok(Work::from_nonce(nonce));
            }

            if state.closed {
                return Err(WorkError::Cancelled);
            }

            if state.racers > 0 && state.failed >= state.racers {
                let err = WorkError::AllBackendsFailed {
                    racers: state.racers,
                    last: state.last_failure.take().unwrap_or_default(),
                };
                self.close(&mut state);
                return Err(err);
            }

            state = match deadline {
                None => self
                    .ready
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        self.close(&mut state);
                        return Err(WorkError::Timeout(timeout.unwrap_or_default()));
                    }
                    self.ready
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }

    pub fn stats(&self) -> DeliveryStats {
        let accepted = self.lock().accepted;
        DeliveryStats {
            attempts: self.attempts.load(Ordering::Relaxed),
            accepted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn first_delivery_wins() {
        let ctx = RaceContext::new();
        assert!(ctx.deliver(7));
        assert!(!ctx.deliver(8));
        assert_eq!(ctx.await_result().unwrap(), Work::from_nonce(7));
        assert_eq!(
            ctx.stats(),
            DeliveryStats {
                attempts: 2,
                accepted: 1
            }
        );
    }

    #[test]
    fn result_is_exposed_big_endian() {
        let ctx = RaceContext::new();
        ctx.deliver(0x0102_0304_0506_0708);
        let work = ctx.await_result().unwrap();
        assert_eq!(work.to_bytes(), [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn await_cancels_the_context() {
        let ctx = RaceContext::new();
        assert!(!ctx.is_cancelled());
        ctx.deliver(1);
        ctx.await_result().unwrap();
        assert!(ctx.is_cancelled());
        assert!(!ctx.deliver(2));
    }

    #[test]
    fn delivery_after_cancel_is_dropped() {
        let ctx = RaceContext::new();
        ctx.cancel();
        assert!(!ctx.deliver(5));
        assert_eq!(ctx.stats().accepted, 0);
        assert!(matches!(ctx.await_result(), Err(WorkError::Cancelled)));
    }

    #[test]
    fn cancel_discards_pending_result() {
        let ctx = RaceContext::new();
        ctx.deliver(9);
        ctx.cancel();
        assert!(matches!(ctx.await_result(), Err(WorkError::Cancelled)));
    }

    #[test]
    fn cancel_is_idempotent() {
        let ctx = RaceContext::new();
        ctx.cancel();
        ctx.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn await_blocks_until_delivery() {
        let ctx = Arc::new(RaceContext::new());
        let producer = {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                ctx.deliver(42)
            })
        };
        assert_eq!(ctx.await_result().unwrap().nonce(), 42);
        assert!(producer.join().unwrap());
    }

    #[test]
    fn timeout_cancels() {
        let ctx = RaceContext::new();
        let err = ctx
            .await_result_timeout(Duration::from_millis(20))
            .unwrap_err();
        assert!(matches!(err, WorkError::Timeout(d) if d == Duration::from_millis(20)));
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn all_racers_failing_ends_the_wait() {
        let ctx = RaceContext::new();
        ctx.register_racer();
        ctx.register_racer();
        ctx.report_failure(&WorkError::NotSupported);
        ctx.report_failure(&WorkError::NoDeviceAvailable);
        match ctx.await_result() {
            Err(WorkError::AllBackendsFailed { racers, last }) => {
                assert_eq!(racers, 2);
                assert_eq!(last, WorkError::NoDeviceAvailable.to_string());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn one_surviving_racer_keeps_the_race_alive() {
        let ctx = RaceContext::new();
        ctx.register_racer();
        ctx.register_racer();
        ctx.report_failure(&WorkError::NotSupported);
        ctx.deliver(3);
        assert_eq!(ctx.await_result().unwrap().nonce(), 3);
    }

    #[test]
    fn concurrent_deliveries_accept_exactly_one() {
        let ctx = Arc::new(RaceContext::new());
        let handles: Vec<_> = (0..16u64)
            .map(|i| {
                let ctx = Arc::clone(&ctx);
                thread::spawn(move || {
                    for j in 0..100 {
                        ctx.deliver(i * 1000 + j);
                    }
                })
            })
            .collect();

        let work = ctx.await_result().unwrap();
        for h in handles {
            h.join().unwrap();
        }

        let stats = ctx.stats();
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.attempts, 1600);
        assert!(work.nonce() % 1000 < 100);
    }
}
