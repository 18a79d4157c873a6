//! Monotonic time sources for the blocking limiters.
//!
//! [`SystemClock`] is the production clock. [`TokioClock`] follows tokio's
//! clock, so it honours `tokio::time::pause` in tests. [`MockClock`] is a
//! manually driven clock, available in test builds or with the
//! `test-helpers` feature.

use std::fmt::Debug;
use std::time::Instant;

/// Port for obtaining the current monotonic instant.
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// System clock implementation using `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock backed by `tokio::time::Instant`.
#[cfg(feature = "async")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[cfg(feature = "async")]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use mock::MockClock;

#[cfg(any(test, feature = "test-helpers"))]
mod mock {
    use super::Clock;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Mock clock for testing.
    ///
    /// Clones share the same underlying instant, so advancing one clone
    /// advances them all.
    ///
    /// ```
    /// use window_gate::clock::{Clock, MockClock};
    /// use std::time::{Duration, Instant};
    ///
    /// let start = Instant::now();
    /// let clock = MockClock::new(start);
    /// clock.advance(Duration::from_secs(10));
    /// assert_eq!(clock.now(), start + Duration::from_secs(10));
    /// ```
    #[derive(Debug, Clone)]
    pub struct MockClock {
        current_time: Arc<Mutex<Instant>>,
    }

    impl MockClock {
        /// Create a mock clock starting at a specific instant.
        pub fn new(start: Instant) -> Self {
            Self {
                current_time: Arc::new(Mutex::new(start)),
            }
        }

        /// Advance the clock by a duration.
        pub fn advance(&self, duration: Duration) {
            *self.current_time.lock() += duration;
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            *self.current_time.lock()
        }
    }
}
