//! error.rs
//! Error and result types for the tick-based core and the blocking limiters.

use crate::types::Uint;
use thiserror::Error;

/// Error type for fast-path core operations. No extra diagnostic information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimpleRateLimitError {
    #[error("Insufficient capacity (fast path).")]
    InsufficientCapacity,
    #[error("Request exceeds maximum capacity (fast path).")]
    BeyondCapacity,
    #[error("Expired tick (fast path).")]
    ExpiredTick,
    #[error("Contention failure (fast path).")]
    ContentionFailure,
}

/// Result type for fast-path core operations.
pub type SimpleAcquireResult = Result<(), SimpleRateLimitError>;

/// Error type for verbose core operations. Contains diagnostic information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerboseRateLimitError {
    /// The window is saturated; retry once the oldest blocking grant has aged out.
    #[error(
        "Insufficient capacity: tried to acquire {acquiring}, available {available}, retry after {retry_after_ticks} tick(s)."
    )]
    InsufficientCapacity {
        acquiring: Uint,
        available: Uint,
        retry_after_ticks: Uint,
    },
    /// Request permanently exceeds the configured limit.
    #[error(
        "Request exceeds maximum capacity: tried to acquire {acquiring}, capacity {capacity}. This request cannot succeed."
    )]
    BeyondCapacity { acquiring: Uint, capacity: Uint },
    /// Provided tick is older than the newest recorded grant.
    #[error("Expired tick: minimum acceptable tick is {min_acceptable_tick}.")]
    ExpiredTick { min_acceptable_tick: Uint },
    /// Failed due to lock contention.
    #[error("Contention failure: resource is locked by another operation. Please retry.")]
    ContentionFailure,
}

/// Result type for verbose core operations.
pub type VerboseAcquireResult = Result<(), VerboseRateLimitError>;

impl From<VerboseRateLimitError> for SimpleRateLimitError {
    fn from(err: VerboseRateLimitError) -> Self {
        match err {
            VerboseRateLimitError::InsufficientCapacity { .. } => SimpleRateLimitError::InsufficientCapacity,
            VerboseRateLimitError::BeyondCapacity { .. } => SimpleRateLimitError::BeyondCapacity,
            VerboseRateLimitError::ExpiredTick { .. } => SimpleRateLimitError::ExpiredTick,
            VerboseRateLimitError::ContentionFailure => SimpleRateLimitError::ContentionFailure,
        }
    }
}

/// Errors surfaced by [`RateLimiter`](crate::rate_limiters::RateLimiter) and its async sibling.
///
/// The taxonomy is deliberately small: a limiter never fails to eventually
/// grant a permit, it only delays. Both kinds are returned to the immediate
/// caller; the limiter does not retry or suppress them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimiterError {
    /// Rejected `(limit, interval)` at construction time. Never raised afterwards.
    #[error("invalid rate limiter configuration: {reason}")]
    InvalidConfiguration { reason: &'static str },

    /// The caller's cancellation token fired before a permit was granted.
    ///
    /// Nothing is recorded for a cancelled attempt.
    #[error("operation cancelled while waiting for a permit")]
    OperationCancelled,

    /// More permits were requested in one call than the limit allows in any window.
    #[error("cannot acquire {acquiring} permits at once: limit is {capacity}")]
    BeyondCapacity { acquiring: Uint, capacity: Uint },
}

impl RateLimiterError {
    pub(crate) fn invalid(reason: &'static str) -> Self {
        RateLimiterError::InvalidConfiguration { reason }
    }
}
