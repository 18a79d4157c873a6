//! Core trait for tick-driven rate limiter algorithms.
//!
//! The trait is non-blocking: every call either succeeds immediately or
//! reports why it could not, so it can be driven by any time source.

pub use crate::types::Uint;
use crate::{SimpleAcquireResult, SimpleRateLimitError, VerboseAcquireResult};

/// The core trait implemented by tick-driven rate limiter algorithms.
///
/// Supports both a fast path with minimal errors and a verbose path whose
/// errors carry the diagnostics a caller needs to schedule a retry.
pub trait RateLimiterCore: Send + Sync {
    /// Attempts to acquire `tokens` permits at the given tick (fast-path).
    ///
    /// # Arguments
    /// * `tick` – Current time tick (from the application)
    /// * `tokens` – Number of permits to acquire
    fn try_acquire_at(&self, tick: Uint, tokens: Uint) -> SimpleAcquireResult;

    /// Attempts to acquire `tokens` permits at the given tick (verbose-path).
    ///
    /// On saturation the error reports how many ticks to wait before the
    /// request could succeed.
    fn try_acquire_verbose_at(&self, tick: Uint, tokens: Uint) -> VerboseAcquireResult;

    /// Returns the number of permits that could still be granted at the given tick.
    fn capacity_remaining(&self, tick: Uint) -> Result<Uint, SimpleRateLimitError>;

    /// Like [`capacity_remaining`](Self::capacity_remaining), with errors mapped to zero.
    fn capacity_remaining_or_0(&self, tick: Uint) -> Uint {
        self.capacity_remaining(tick).unwrap_or(0)
    }
}
