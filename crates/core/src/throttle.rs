//! Rate limiting for upstream calls.
//!
//! The gate hands every caller a dispatch slot at least `delay` after the
//! previous one. Slots are assigned under a lock, so callers proceed in lock
//! order and the spacing holds across threads as well as tasks.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

/// Source of the current time for the gate.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Clock backed by tokio's timer, which honours `tokio::time::pause`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// Enforces a minimum interval between successive upstream dispatches.
#[derive(Debug)]
pub struct ThrottleGate<C = TokioClock> {
    delay: Duration,
    clock: C,
    last_dispatch: Mutex<Option<Instant>>,
}

impl ThrottleGate<TokioClock> {
    /// Gate with the given spacing, driven by the tokio clock.
    pub fn new(delay: Duration) -> Self {
        Self::with_clock(delay, TokioClock)
    }
}

impl<C: Clock> ThrottleGate<C> {
    /// Gate with the given spacing and an explicit clock.
    pub fn with_clock(delay: Duration, clock: C) -> Self {
        Self {
            delay,
            clock,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Configured spacing.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Claim the next dispatch slot and return how long the caller must wait
    /// before using it.
    pub fn reserve(&self) -> Duration {
        let mut last = self.last_dispatch.lock();
        let now = self.clock.now();
        let slot = match *last {
            Some(previous) => (previous + self.delay).max(now),
            None => now,
        };
        *last = Some(slot);
        slot - now
    }

    /// Suspend until the caller may dispatch. Never fails.
    pub async fn acquire(&self) {
        let wait = self.reserve();
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "throttling upstream request");
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Clone)]
    struct ManualClock {
        now: Arc<Mutex<Instant>>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Arc::new(Mutex::new(Instant::now())),
            }
        }

        fn advance(&self, by: Duration) {
            *self.now.lock() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock()
        }
    }

    const DELAY: Duration = Duration::from_millis(1000);

    #[test]
    fn first_reservation_is_immediate() {
        let gate = ThrottleGate::with_clock(DELAY, ManualClock::new());
        assert_eq!(gate.reserve(), Duration::ZERO);
    }

    #[test]
    fn back_to_back_reservations_are_spaced() {
        let gate = ThrottleGate::with_clock(DELAY, ManualClock::new());
        let waits: Vec<_> = (0..4).map(|_| gate.reserve()).collect();
        assert_eq!(
            waits,
            vec![
                Duration::ZERO,
                DELAY,
                DELAY * 2,
                DELAY * 3,
            ]
        );
    }

    #[test]
    fn partial_idle_shortens_the_wait() {
        let clock = ManualClock::new();
        let gate = ThrottleGate::with_clock(DELAY, clock.clone());
        gate.reserve();
        clock.advance(Duration::from_millis(400));
        assert_eq!(gate.reserve(), Duration::from_millis(600));
    }

    #[test]
    fn long_idle_imposes_no_wait() {
        let clock = ManualClock::new();
        let gate = ThrottleGate::with_clock(DELAY, clock.clone());
        gate.reserve();
        clock.advance(Duration::from_millis(2500));
        assert_eq!(gate.reserve(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_acquires_dispatch_at_least_delay_apart() {
        let gate = Arc::new(ThrottleGate::new(DELAY));
        let start = tokio::time::Instant::now();

        let mut handles = Vec::new();
        for _ in 0..5 {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                gate.acquire().await;
                tokio::time::Instant::now()
            }));
        }

        let mut dispatched = Vec::new();
        for handle in handles {
            dispatched.push(handle.await.expect("task panicked"));
        }
        dispatched.sort();

        assert!(dispatched[0] - start < DELAY);
        for pair in dispatched.windows(2) {
            assert!(pair[1] - pair[0] >= DELAY, "dispatches closer than delay");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn idle_gate_does_not_delay_single_call() {
        let gate = ThrottleGate::new(DELAY);
        gate.acquire().await;
        tokio::time::advance(Duration::from_millis(1500)).await;

        let before = tokio::time::Instant::now();
        gate.acquire().await;
        assert_eq!(tokio::time::Instant::now(), before);
    }
}
