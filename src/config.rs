//! Limiter configuration.

use std::time::Duration;

use crate::{RateLimiterError, Uint};

/// Default number of permits per window.
pub const DEFAULT_LIMIT: Uint = 5;

/// Default window length in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 1_000;

/// `(limit, interval)` pair for building a limiter.
///
/// With the `serde` feature this deserializes from e.g.
/// `{ "limit": 10, "interval_ms": 60000 }`; missing fields take the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RateLimiterConfig {
    /// Maximum permits within any window. Must be positive.
    pub limit: Uint,
    /// Sliding window length in milliseconds. Must be positive.
    pub interval_ms: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl RateLimiterConfig {
    /// Creates a configuration from a limit and a window length.
    ///
    /// Sub-millisecond precision is truncated; use
    /// [`RateLimiter::new`](crate::rate_limiters::RateLimiter::new) directly
    /// for finer windows.
    pub fn new(limit: Uint, interval: Duration) -> Self {
        Self {
            limit,
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Window length as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Checks that both the limit and the interval are positive.
    pub fn validate(&self) -> Result<(), RateLimiterError> {
        validate(self.limit, self.interval())
    }
}

pub(crate) fn validate(limit: Uint, interval: Duration) -> Result<(), RateLimiterError> {
    if limit == 0 {
        return Err(RateLimiterError::invalid("limit must be greater than 0"));
    }
    if interval.is_zero() {
        return Err(RateLimiterError::invalid("interval must be greater than 0"));
    }
    if crate::types::duration_to_ticks(interval).is_none() {
        return Err(RateLimiterError::invalid("interval is too long to count in nanoseconds"));
    }
    Ok(())
}
