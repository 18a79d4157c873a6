use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::sliding_window_log_core::SlidingWindowLog;
use crate::cancel::CancelToken;
use crate::clock::{Clock, SystemClock};
use crate::config::{self, RateLimiterConfig};
use crate::types::{duration_to_ticks, ticks_to_duration};
use crate::{RateLimiterError, Uint, VerboseRateLimitError};

/// Shortest sleep taken while saturated, so a rounding-to-zero wait cannot spin.
pub const MIN_WAIT: Duration = Duration::from_millis(1);

/// A blocking sliding-window rate limiter.
///
/// At most `limit` permits are granted within any trailing window of length
/// `interval`. A caller that would exceed the limit is put to sleep until the
/// oldest grant in its way leaves the window, then retries.
///
/// The grant log is checked and updated under a mutex, but the mutex is
/// released while a caller sleeps, so other callers keep making progress.
/// No slot is reserved for a sleeping caller: whoever re-checks first after
/// a slot frees up takes it. There is **no FIFO ordering** among waiters; if
/// arrival-order fairness matters, queue callers in front of the limiter.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use window_gate::rate_limiters::RateLimiter;
///
/// let limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(1)).unwrap());
///
/// let workers: Vec<_> = (0..3)
///     .map(|_| {
///         let limiter = Arc::clone(&limiter);
///         std::thread::spawn(move || {
///             limiter.acquire();
///             // perform the guarded call
///         })
///     })
///     .collect();
///
/// for worker in workers {
///     worker.join().unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct RateLimiter<C: Clock = SystemClock> {
    limit: Uint,
    interval: Duration,
    clock: C,
    /// Tick zero; ticks are nanoseconds since this instant
    epoch: Instant,
    state: Mutex<SlidingWindowLog>,
}

impl RateLimiter<SystemClock> {
    /// Creates a limiter granting at most `limit` permits per `interval`.
    ///
    /// # Errors
    /// [`RateLimiterError::InvalidConfiguration`] if `limit` is zero or
    /// `interval` is zero. Never blocks.
    pub fn new(limit: Uint, interval: Duration) -> Result<Self, RateLimiterError> {
        Self::with_clock(limit, interval, SystemClock)
    }

    /// Creates a limiter granting at most `limit` permits per second.
    pub fn per_second(limit: Uint) -> Result<Self, RateLimiterError> {
        Self::new(limit, Duration::from_secs(1))
    }

    /// Creates a limiter from a [`RateLimiterConfig`].
    pub fn from_config(config: &RateLimiterConfig) -> Result<Self, RateLimiterError> {
        Self::new(config.limit, config.interval())
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Creates a limiter that reads time from `clock`.
    pub fn with_clock(limit: Uint, interval: Duration, clock: C) -> Result<Self, RateLimiterError> {
        config::validate(limit, interval)?;
        let window_ticks = duration_to_ticks(interval)
            .ok_or(RateLimiterError::invalid("interval is too long to count in nanoseconds"))?;

        debug!(limit = %limit, interval = ?interval, "rate limiter created");

        Ok(RateLimiter {
            limit,
            interval,
            epoch: clock.now(),
            clock,
            state: Mutex::new(SlidingWindowLog::new(limit, window_ticks)),
        })
    }

    /// Maximum permits within any window.
    pub fn limit(&self) -> Uint {
        self.limit
    }

    /// Length of the sliding window.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks the calling thread until a permit is granted.
    ///
    /// Never fails; it only delays.
    pub fn acquire(&self) {
        loop {
            match self.attempt(1) {
                Ok(()) => return,
                Err(wait) => std::thread::sleep(wait.max(MIN_WAIT)),
            }
        }
    }

    /// Blocks until `permits` permits can be granted together, then records all of them.
    ///
    /// `permits == 0` returns immediately.
    ///
    /// # Errors
    /// [`RateLimiterError::BeyondCapacity`] without blocking if `permits`
    /// exceeds the limit, since such a request could never be granted.
    pub fn acquire_many(&self, permits: Uint) -> Result<(), RateLimiterError> {
        self.check_permits(permits)?;
        loop {
            match self.attempt(permits) {
                Ok(()) => return Ok(()),
                Err(wait) => std::thread::sleep(wait.max(MIN_WAIT)),
            }
        }
    }

    /// Like [`acquire`](Self::acquire), but gives up when `cancel` fires.
    ///
    /// The token is only consulted while the caller would have to wait: a
    /// permit that is available straight away is granted even if the token
    /// is already cancelled.
    ///
    /// # Errors
    /// [`RateLimiterError::OperationCancelled`] if the token is cancelled
    /// while waiting. No grant is recorded in that case.
    pub fn acquire_with_cancel(&self, cancel: &CancelToken) -> Result<(), RateLimiterError> {
        loop {
            let wait = match self.attempt(1) {
                Ok(()) => return Ok(()),
                Err(wait) => wait,
            };
            if cancel.wait_timeout(wait.max(MIN_WAIT)) {
                debug!("rate limiter wait cancelled");
                return Err(RateLimiterError::OperationCancelled);
            }
        }
    }

    /// Makes a single non-blocking attempt.
    ///
    /// On saturation returns how long the caller would have had to wait.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.attempt(1)
    }

    pub(crate) fn check_permits(&self, permits: Uint) -> Result<(), RateLimiterError> {
        if permits > self.limit {
            return Err(RateLimiterError::BeyondCapacity {
                acquiring: permits,
                capacity: self.limit,
            });
        }
        Ok(())
    }

    /// One locked check-prune-grant pass. The lock is released on return.
    pub(crate) fn attempt(&self, permits: Uint) -> Result<(), Duration> {
        let mut state = self.state.lock();
        let tick = self.tick_now();

        match state.try_record(tick, permits) {
            Ok(()) => {
                trace!(permits = %permits, tick = %tick, "permit granted");
                Ok(())
            }
            Err(VerboseRateLimitError::InsufficientCapacity { available, retry_after_ticks, .. }) => {
                let wait = ticks_to_duration(retry_after_ticks);
                debug!(available = %available, wait = ?wait, "rate limit saturated");
                Err(wait)
            }
            // Instants are monotonic, so this only guards against a misbehaving clock.
            Err(VerboseRateLimitError::ExpiredTick { min_acceptable_tick }) => {
                Err(ticks_to_duration(min_acceptable_tick.saturating_sub(tick)))
            }
            // Callers check the limit first and the log has no lock of its own.
            Err(VerboseRateLimitError::BeyondCapacity { .. })
            | Err(VerboseRateLimitError::ContentionFailure) => Err(self.interval),
        }
    }

    fn tick_now(&self) -> Uint {
        let elapsed = self.clock.now().saturating_duration_since(self.epoch);
        duration_to_ticks(elapsed).unwrap_or(Uint::MAX)
    }
}
