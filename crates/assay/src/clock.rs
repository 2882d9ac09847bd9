//! Clocks for the Condition Poller
//!
//! Every wait measures time through a [`Clock`] so that deadline arithmetic
//! can be driven by a [`FakeClock`] in tests. A fake clock never blocks:
//! `sleep` simply moves its time forward.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source used by the poller
pub trait Clock: fmt::Debug + Send + Sync {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Thread-safe clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Create a shared handle
    #[must_use]
    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Fake clock for deterministic testing
///
/// Time only moves when someone sleeps on the clock or calls
/// [`FakeClock::advance`].
#[derive(Debug, Default)]
pub struct FakeClock {
    /// Current time in nanoseconds since the origin
    current_ns: AtomicU64,
    /// Number of `sleep` calls observed
    sleeps: AtomicU64,
}

impl FakeClock {
    /// Create a fake clock at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared fake clock
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Fast-forward time by `duration` without counting a sleep
    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.current_ns.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Fast-forward time by milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Number of times the clock has been slept on
    #[must_use]
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.current_ns.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod fake_clock_tests {
        use super::*;

        #[test]
        fn test_starts_at_zero() {
            let clock = FakeClock::new();
            assert_eq!(clock.now(), Duration::ZERO);
            assert_eq!(clock.sleep_count(), 0);
        }

        #[test]
        fn test_sleep_advances_time() {
            let clock = FakeClock::new();
            clock.sleep(Duration::from_millis(250));
            clock.sleep(Duration::from_millis(250));
            assert_eq!(clock.now(), Duration::from_millis(500));
            assert_eq!(clock.sleep_count(), 2);
        }

        #[test]
        fn test_advance_does_not_count_as_sleep() {
            let clock = FakeClock::new();
            clock.advance_ms(1_500);
            assert_eq!(clock.now(), Duration::from_millis(1_500));
            assert_eq!(clock.sleep_count(), 0);
        }

        #[test]
        fn test_shared_handle_sees_same_time() {
            let clock = FakeClock::shared();
            let handle: SharedClock = clock.clone();
            handle.sleep(Duration::from_secs(2));
            assert_eq!(clock.now(), Duration::from_secs(2));
        }
    }

    mod system_clock_tests {
        use super::*;

        #[test]
        fn test_now_is_monotonic() {
            let clock = SystemClock::new();
            let a = clock.now();
            let b = clock.now();
            assert!(b >= a);
        }

        #[test]
        fn test_sleep_waits_at_least_duration() {
            let clock = SystemClock::new();
            let before = clock.now();
            clock.sleep(Duration::from_millis(5));
            assert!(clock.now() - before >= Duration::from_millis(5));
        }
    }
}
