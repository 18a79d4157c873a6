use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::rate_limiter_core::RateLimiterCore;
use crate::{SimpleAcquireResult, SimpleRateLimitError, Uint, VerboseAcquireResult, VerboseRateLimitError};

/// The grant log and the sliding-window-log algorithm, without any locking.
///
/// Grants are stored as runs of `(tick, count)`, oldest first, so a single
/// multi-permit grant costs one entry however large it is. Ticks are appended
/// in granting order and a tick older than the newest entry is rejected, so
/// the log stays sorted and pruning only ever pops from the front.
///
/// A run stays inside the window while `run_tick >= tick - window_ticks`.
#[derive(Debug)]
pub(crate) struct SlidingWindowLog {
    capacity: Uint,
    window_ticks: Uint,
    runs: VecDeque<(Uint, Uint)>,
    /// Sum of all run counts
    granted: Uint,
}

impl SlidingWindowLog {
    pub(crate) fn new(capacity: Uint, window_ticks: Uint) -> Self {
        SlidingWindowLog {
            capacity,
            window_ticks,
            runs: VecDeque::new(),
            granted: 0,
        }
    }

    pub(crate) fn capacity(&self) -> Uint {
        self.capacity
    }

    /// Attempts to record `permits` grants at `tick`.
    ///
    /// On saturation nothing is recorded and the error carries the number of
    /// ticks after which enough grants will have left the window.
    pub(crate) fn try_record(&mut self, tick: Uint, permits: Uint) -> VerboseAcquireResult {
        if permits == 0 {
            return Ok(());
        }

        self.check_tick(tick)?;

        if permits > self.capacity {
            return Err(VerboseRateLimitError::BeyondCapacity {
                acquiring: permits,
                capacity: self.capacity,
            });
        }

        self.prune(tick);

        let available = self.available();
        if permits <= available {
            match self.runs.back_mut() {
                Some((newest, count)) if *newest == tick => *count += permits,
                _ => self.runs.push_back((tick, permits)),
            }
            self.granted += permits;
            return Ok(());
        }

        // Once the run holding the grant at this position expires, `permits` slots are free.
        let blocking = self.tick_of_grant(permits - available - 1);
        let retry_after_ticks = blocking
            .saturating_add(self.window_ticks)
            .saturating_add(1)
            .saturating_sub(tick);

        Err(VerboseRateLimitError::InsufficientCapacity {
            acquiring: permits,
            available,
            retry_after_ticks,
        })
    }

    /// Prunes expired grants and returns how many permits are free at `tick`.
    pub(crate) fn remaining(&mut self, tick: Uint) -> Result<Uint, VerboseRateLimitError> {
        self.check_tick(tick)?;
        self.prune(tick);
        Ok(self.available())
    }

    #[inline]
    fn available(&self) -> Uint {
        self.capacity.saturating_sub(self.granted)
    }

    /// Tick of the grant at zero-based `position`, counting from the oldest.
    fn tick_of_grant(&self, position: Uint) -> Uint {
        let mut seen: Uint = 0;
        for &(tick, count) in &self.runs {
            seen += count;
            if position < seen {
                return tick;
            }
        }
        // position < granted whenever the log is saturated
        self.runs.back().map_or(0, |&(tick, _)| tick)
    }

    #[inline]
    fn check_tick(&self, tick: Uint) -> Result<(), VerboseRateLimitError> {
        match self.runs.back() {
            Some(&(newest, _)) if tick < newest => Err(VerboseRateLimitError::ExpiredTick {
                min_acceptable_tick: newest,
            }),
            _ => Ok(()),
        }
    }

    #[inline]
    fn prune(&mut self, tick: Uint) {
        let cutoff = tick.saturating_sub(self.window_ticks);
        while let Some(&(granted_at, count)) = self.runs.front() {
            if granted_at >= cutoff {
                break;
            }
            self.runs.pop_front();
            self.granted -= count;
        }
    }
}

/// Core implementation of the sliding window log rate limiting algorithm.
///
/// Every granted permit is logged with the tick it was granted at. A request
/// is allowed when the number of logged grants inside the trailing window,
/// plus the request, stays within `capacity`. Unlike fixed or bucketed
/// windows there is no boundary at which a burst of `2 * capacity` could be
/// admitted within one window length.
///
/// # Algorithm Behavior
///
/// - The window at `tick` spans `[tick - window_ticks, tick]`
/// - Grants older than the window are pruned lazily, on the next call
/// - Ticks must not go backwards relative to the newest grant
/// - The internal lock is taken with `try_lock`; contention is reported, never waited on
///
/// # Example
///
/// ```rust
/// use window_gate::rate_limiters::SlidingWindowLogCore;
///
/// // At most 3 permits in any 10-tick window
/// let core = SlidingWindowLogCore::new(3, 10);
///
/// assert_eq!(core.try_acquire_at(0, 2), Ok(()));
/// assert_eq!(core.try_acquire_at(4, 1), Ok(()));
/// assert!(core.try_acquire_at(9, 1).is_err());
///
/// // Tick 11: the two grants from tick 0 have left the window
/// assert_eq!(core.try_acquire_at(11, 2), Ok(()));
/// ```
pub struct SlidingWindowLogCore {
    /// Grant log protected by mutex for thread safety
    state: Mutex<SlidingWindowLog>,
}

impl RateLimiterCore for SlidingWindowLogCore {
    #[inline(always)]
    fn try_acquire_at(&self, tick: Uint, tokens: Uint) -> SimpleAcquireResult {
        self.try_acquire_at(tick, tokens)
    }

    #[inline(always)]
    fn try_acquire_verbose_at(&self, tick: Uint, tokens: Uint) -> VerboseAcquireResult {
        self.try_acquire_verbose_at(tick, tokens)
    }

    #[inline(always)]
    fn capacity_remaining(&self, tick: Uint) -> Result<Uint, SimpleRateLimitError> {
        self.capacity_remaining(tick)
    }
}

impl SlidingWindowLogCore {
    /// Creates a new sliding window log.
    ///
    /// # Parameters
    ///
    /// * `capacity` - Maximum number of permits granted within any window
    /// * `window_ticks` - Length of the sliding window in ticks
    ///
    /// # Panics
    ///
    /// Panics if either parameter is zero.
    pub fn new(capacity: Uint, window_ticks: Uint) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        assert!(window_ticks > 0, "window_ticks must be greater than 0");

        SlidingWindowLogCore {
            state: Mutex::new(SlidingWindowLog::new(capacity, window_ticks)),
        }
    }

    /// Attempts to acquire `tokens` permits at the given tick.
    ///
    /// # Returns
    /// * `Ok(())` - The permits were granted and logged
    /// * `Err(SimpleRateLimitError::InsufficientCapacity)` - The window is saturated
    /// * `Err(SimpleRateLimitError::BeyondCapacity)` - `tokens` exceeds the capacity
    /// * `Err(SimpleRateLimitError::ContentionFailure)` - The internal lock is held
    /// * `Err(SimpleRateLimitError::ExpiredTick)` - The tick is older than the newest grant
    #[inline(always)]
    pub fn try_acquire_at(&self, tick: Uint, tokens: Uint) -> SimpleAcquireResult {
        self.try_acquire_verbose_at(tick, tokens).map_err(SimpleRateLimitError::from)
    }

    /// Attempts to acquire `tokens` permits at the given tick, returning
    /// detailed diagnostics on failure.
    ///
    /// When the window is saturated the error reports how many permits are
    /// free and after how many ticks the request would fit.
    ///
    /// # Example
    /// ```
    /// use window_gate::rate_limiters::SlidingWindowLogCore;
    /// use window_gate::VerboseRateLimitError;
    ///
    /// let core = SlidingWindowLogCore::new(2, 100);
    /// core.try_acquire_verbose_at(10, 2).unwrap();
    ///
    /// match core.try_acquire_verbose_at(50, 1) {
    ///     Err(VerboseRateLimitError::InsufficientCapacity { retry_after_ticks, .. }) => {
    ///         assert_eq!(retry_after_ticks, 61);
    ///     }
    ///     other => panic!("unexpected {:?}", other),
    /// }
    /// ```
    #[inline(always)]
    pub fn try_acquire_verbose_at(&self, tick: Uint, tokens: Uint) -> VerboseAcquireResult {
        if tokens == 0 {
            return Ok(());
        }

        let mut state = self
            .state
            .try_lock()
            .ok_or(VerboseRateLimitError::ContentionFailure)?;

        state.try_record(tick, tokens)
    }

    /// Returns how many permits could be granted at the given tick.
    ///
    /// Expired grants are pruned as a side effect.
    #[inline]
    pub fn capacity_remaining(&self, tick: Uint) -> Result<Uint, SimpleRateLimitError> {
        let mut state = self
            .state
            .try_lock()
            .ok_or(SimpleRateLimitError::ContentionFailure)?;

        state.remaining(tick).map_err(SimpleRateLimitError::from)
    }

    /// The maximum number of permits within one window.
    pub fn capacity(&self) -> Uint {
        self.state.lock().capacity()
    }
}

/// Configuration structure for creating a `SlidingWindowLogCore`.
#[derive(Debug, Clone)]
pub struct SlidingWindowLogCoreConfig {
    /// Maximum number of permits within one window.
    pub capacity: Uint,
    /// Length of the sliding window in ticks.
    pub window_ticks: Uint,
}

impl SlidingWindowLogCoreConfig {
    /// Creates a new configuration instance.
    pub fn new(capacity: Uint, window_ticks: Uint) -> Self {
        Self {
            capacity,
            window_ticks,
        }
    }
}

impl From<SlidingWindowLogCoreConfig> for SlidingWindowLogCore {
    /// Converts a `SlidingWindowLogCoreConfig` into a `SlidingWindowLogCore`.
    ///
    /// # Panics
    /// Panics if any field in the config is zero.
    ///
    /// ```
    /// use window_gate::rate_limiters::{SlidingWindowLogCore, SlidingWindowLogCoreConfig};
    ///
    /// let core: SlidingWindowLogCore = SlidingWindowLogCoreConfig::new(5, 1_000).into();
    /// assert_eq!(core.capacity(), 5);
    /// ```
    #[inline(always)]
    fn from(config: SlidingWindowLogCoreConfig) -> Self {
        SlidingWindowLogCore::new(config.capacity, config.window_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_on_the_cutoff_is_still_inside_the_window() {
        let mut log = SlidingWindowLog::new(1, 10);
        assert_eq!(log.try_record(5, 1), Ok(()));

        // cutoff = 15 - 10 = 5, the grant at 5 still counts
        assert_eq!(
            log.try_record(15, 1),
            Err(VerboseRateLimitError::InsufficientCapacity {
                acquiring: 1,
                available: 0,
                retry_after_ticks: 1,
            })
        );
        assert_eq!(log.try_record(16, 1), Ok(()));
    }

    #[test]
    fn multi_permit_retry_waits_for_enough_entries() {
        let mut log = SlidingWindowLog::new(3, 10);
        assert_eq!(log.try_record(0, 1), Ok(()));
        assert_eq!(log.try_record(2, 1), Ok(()));
        assert_eq!(log.try_record(4, 1), Ok(()));

        // Two permits need the grants at 0 and 2 to expire: 2 + 10 + 1 - 5
        match log.try_record(5, 2) {
            Err(VerboseRateLimitError::InsufficientCapacity { available, retry_after_ticks, .. }) => {
                assert_eq!(available, 0);
                assert_eq!(retry_after_ticks, 8);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(log.try_record(13, 2), Ok(()));
    }

    #[test]
    fn failed_attempt_records_nothing() {
        let mut log = SlidingWindowLog::new(2, 10);
        assert_eq!(log.try_record(0, 2), Ok(()));
        assert!(log.try_record(1, 1).is_err());
        assert_eq!(log.remaining(1), Ok(0));
        assert_eq!(log.remaining(11), Ok(2));
    }

    #[test]
    fn huge_grant_is_a_single_run() {
        let mut log = SlidingWindowLog::new(Uint::MAX, 10);
        assert_eq!(log.try_record(0, Uint::MAX / 2), Ok(()));
        assert_eq!(log.try_record(0, Uint::MAX / 2), Ok(()));
        assert_eq!(log.runs.len(), 1);
        assert_eq!(log.remaining(5), Ok(1));

        match log.try_record(7, 2) {
            Err(VerboseRateLimitError::InsufficientCapacity { available, retry_after_ticks, .. }) => {
                assert_eq!(available, 1);
                assert_eq!(retry_after_ticks, 4);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(log.remaining(11), Ok(Uint::MAX));
    }

    #[test]
    fn retry_position_walks_across_runs() {
        let mut log = SlidingWindowLog::new(6, 10);
        assert_eq!(log.try_record(0, 2), Ok(()));
        assert_eq!(log.try_record(3, 3), Ok(()));
        assert_eq!(log.try_record(5, 1), Ok(()));

        // Four permits need the two grants at 0 and two of the three at 3 gone
        match log.try_record(6, 4) {
            Err(VerboseRateLimitError::InsufficientCapacity { retry_after_ticks, .. }) => {
                assert_eq!(retry_after_ticks, 3 + 10 + 1 - 6);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(log.try_record(13, 4).is_err());
        assert_eq!(log.try_record(14, 4), Ok(()));
    }

    #[test]
    fn held_lock_reports_contention() {
        let core = SlidingWindowLogCore::new(5, 10);
        let _held = core.state.lock();

        assert_eq!(core.try_acquire_at(0, 1), Err(SimpleRateLimitError::ContentionFailure));
        assert_eq!(
            core.try_acquire_verbose_at(0, 1),
            Err(VerboseRateLimitError::ContentionFailure)
        );
        assert_eq!(core.capacity_remaining(0), Err(SimpleRateLimitError::ContentionFailure));
    }
}
