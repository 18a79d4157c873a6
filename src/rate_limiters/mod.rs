//! Rate limiter implementations.
//!
//! - **[`SlidingWindowLogCore`]** - Non-blocking sliding window log driven by explicit ticks
//! - **[`RateLimiter`]** - Blocking limiter over a monotonic clock; saturated callers sleep
//! - **[`AsyncRateLimiter`]** - The same contract for tokio tasks (feature `async`)
//!
//! | Type | Time source | When saturated |
//! |------|-------------|----------------|
//! | `SlidingWindowLogCore` | caller-supplied ticks | returns `InsufficientCapacity` with `retry_after_ticks` |
//! | `RateLimiter` | [`Clock`](crate::clock::Clock) | parks the thread, then retries |
//! | `AsyncRateLimiter` | tokio clock | `tokio::time::sleep`, then retries |
//!
//! # Thread Safety
//!
//! All three share one algorithm and guard their grant log with a mutex. The
//! core only ever `try_lock`s and reports `ContentionFailure`; the blocking
//! limiters lock, check and release before sleeping.

pub mod sliding_window_log_core;
pub use sliding_window_log_core::SlidingWindowLogCore;
pub use sliding_window_log_core::SlidingWindowLogCoreConfig;

pub mod blocking_rate_limiter;
pub use blocking_rate_limiter::RateLimiter;

#[cfg(feature = "async")]
pub mod async_rate_limiter;
#[cfg(feature = "async")]
pub use async_rate_limiter::AsyncRateLimiter;
