//! A blocking sliding-window rate limiter.
//!
//! A [`RateLimiter`](rate_limiters::RateLimiter) grants at most `limit`
//! permits within any trailing window of length `interval`. Callers that
//! would exceed the limit are suspended until a permit frees up instead of
//! being rejected.
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use window_gate::rate_limiters::RateLimiter;
//!
//! // At most 5 calls in any one-second window
//! let limiter = RateLimiter::new(5, Duration::from_secs(1)).unwrap();
//!
//! for _ in 0..5 {
//!     limiter.acquire(); // returns immediately while under the limit
//! }
//! ```
//!
//! # Available Types
//!
//! ## [Blocking limiter](rate_limiters::RateLimiter)
//! Parks the calling thread while saturated. Supports cancellation through a
//! [`CancelToken`]:
//! ```rust
//! # use std::time::Duration;
//! # use window_gate::{CancelToken, RateLimiter};
//! let limiter = RateLimiter::new(1, Duration::from_millis(50)).unwrap();
//! let token = CancelToken::new();
//! assert!(limiter.acquire_with_cancel(&token).is_ok());
//! ```
//!
//! ## [Async limiter](rate_limiters::AsyncRateLimiter)
//! Same contract for tokio tasks, cancellable with
//! `tokio_util::sync::CancellationToken` (feature `async`, on by default).
//!
//! ## [Sliding Window Log core](rate_limiters::SlidingWindowLogCore)
//! Non-blocking algorithm core driven by caller-supplied ticks:
//! ```rust
//! # use window_gate::rate_limiters::SlidingWindowLogCore;
//! let core = SlidingWindowLogCore::new(100, 60); // 100 permits per 60 ticks
//! assert_eq!(core.try_acquire_at(0, 1), Ok(()));
//! ```
//!
//! # Core Concepts
//!
//! ## Sliding window log
//! Every grant is logged with its timestamp. A permit is granted when fewer
//! than `limit` logged grants lie inside the window ending now. Expired
//! entries are pruned lazily during acquisition; there is no background task.
//! Because the window slides, there is no boundary at which `2 * limit`
//! calls could slip through.
//!
//! ## Error Handling
//! [`RateLimiterError`] has three variants:
//! - **[`InvalidConfiguration`](RateLimiterError::InvalidConfiguration)** - zero limit or interval at construction
//! - **[`OperationCancelled`](RateLimiterError::OperationCancelled)** - the caller's token fired while it waited
//! - **[`BeyondCapacity`](RateLimiterError::BeyondCapacity)** - `acquire_many` asked for more than the limit
//!
//! ## Fairness
//! Waiters are **not** served in arrival order. Any waiter may take a freed
//! slot.

pub mod cancel;
pub mod clock;
pub mod config;
pub mod error;
pub mod rate_limiter_core;
pub mod rate_limiters;
pub mod types;

pub use cancel::CancelToken;
pub use config::RateLimiterConfig;
pub use error::{
    RateLimiterError, SimpleAcquireResult, SimpleRateLimitError, VerboseAcquireResult,
    VerboseRateLimitError,
};
pub use rate_limiters::RateLimiter;
#[cfg(feature = "async")]
pub use rate_limiters::AsyncRateLimiter;
pub use types::Uint;
