use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::blocking_rate_limiter::{RateLimiter, MIN_WAIT};
use crate::clock::TokioClock;
use crate::config::RateLimiterConfig;
use crate::{RateLimiterError, Uint};

/// The [`RateLimiter`] contract for tokio tasks.
///
/// Saturated callers sleep with `tokio::time::sleep` instead of parking the
/// thread, and time is read through tokio's clock, so `tokio::time::pause`
/// drives the limiter in tests. The grant log lock is never held across an
/// await point. As with the blocking limiter, waiters are not served in FIFO
/// order.
///
/// ```rust
/// use std::time::Duration;
/// use window_gate::rate_limiters::AsyncRateLimiter;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let limiter = AsyncRateLimiter::new(5, Duration::from_secs(1)).unwrap();
/// limiter.acquire().await;
/// # }
/// ```
#[derive(Debug)]
pub struct AsyncRateLimiter {
    inner: RateLimiter<TokioClock>,
}

impl AsyncRateLimiter {
    /// Creates a limiter granting at most `limit` permits per `interval`.
    ///
    /// # Errors
    /// [`RateLimiterError::InvalidConfiguration`] if either argument is zero.
    pub fn new(limit: Uint, interval: Duration) -> Result<Self, RateLimiterError> {
        let inner = RateLimiter::with_clock(limit, interval, TokioClock)?;
        Ok(Self { inner })
    }

    /// Creates a limiter granting at most `limit` permits per second.
    pub fn per_second(limit: Uint) -> Result<Self, RateLimiterError> {
        Self::new(limit, Duration::from_secs(1))
    }

    /// Creates a limiter from a [`RateLimiterConfig`].
    pub fn from_config(config: &RateLimiterConfig) -> Result<Self, RateLimiterError> {
        Self::new(config.limit, config.interval())
    }

    /// Maximum permits within any window.
    pub fn limit(&self) -> Uint {
        self.inner.limit()
    }

    /// Length of the sliding window.
    pub fn interval(&self) -> Duration {
        self.inner.interval()
    }

    /// Waits until a permit is granted. Never fails.
    pub async fn acquire(&self) {
        while let Err(wait) = self.inner.attempt(1) {
            tokio::time::sleep(wait.max(MIN_WAIT)).await;
        }
    }

    /// Waits until `permits` permits can be granted together.
    ///
    /// # Errors
    /// [`RateLimiterError::BeyondCapacity`] immediately if `permits` exceeds the limit.
    pub async fn acquire_many(&self, permits: Uint) -> Result<(), RateLimiterError> {
        self.inner.check_permits(permits)?;
        while let Err(wait) = self.inner.attempt(permits) {
            tokio::time::sleep(wait.max(MIN_WAIT)).await;
        }
        Ok(())
    }

    /// Like [`acquire`](Self::acquire), but gives up when `cancel` fires while waiting.
    ///
    /// Dropping the returned future is also a clean cancellation: nothing is
    /// recorded until a permit is actually granted.
    ///
    /// # Errors
    /// [`RateLimiterError::OperationCancelled`] if the token fires before a grant.
    pub async fn acquire_with_cancel(&self, cancel: &CancellationToken) -> Result<(), RateLimiterError> {
        while let Err(wait) = self.inner.attempt(1) {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("rate limiter wait cancelled");
                    return Err(RateLimiterError::OperationCancelled);
                }
                _ = tokio::time::sleep(wait.max(MIN_WAIT)) => {}
            }
        }
        Ok(())
    }

    /// Makes a single non-blocking attempt, returning the required wait on saturation.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.inner.try_acquire()
    }
}
