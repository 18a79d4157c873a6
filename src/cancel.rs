//! Cooperative cancellation for threads blocked in
//! [`RateLimiter::acquire_with_cancel`](crate::rate_limiters::RateLimiter::acquire_with_cancel).

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// A cloneable cancellation flag that wakes blocked waiters when set.
///
/// All clones share one flag. Cancelling is permanent.
///
/// ```
/// use window_gate::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every thread waiting on it.
    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        *cancelled = true;
        self.inner.wake.notify_all();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Sleeps for up to `timeout`, returning early if the token is cancelled.
    ///
    /// Returns `true` if the token was cancelled. A spurious early return with
    /// `false` is possible; callers re-check their own condition anyway.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut cancelled = self.inner.cancelled.lock();
        if !*cancelled {
            self.inner.wake.wait_for(&mut cancelled, timeout);
        }
        *cancelled
    }
}
