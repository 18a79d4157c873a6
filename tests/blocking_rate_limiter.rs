use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use window_gate::clock::Clock;
use window_gate::{CancelToken, RateLimiter, RateLimiterConfig, RateLimiterError, Uint};

/// System clock that remembers the last instant each thread read.
///
/// The limiter reads the clock once per locked attempt and grants at that
/// instant, so after `acquire` returns the thread's last reading is its grant time.
#[derive(Debug, Clone, Default)]
struct RecordingClock {
    last_read: Arc<Mutex<HashMap<ThreadId, Instant>>>,
}

impl RecordingClock {
    fn last_read_by_current_thread(&self) -> Option<Instant> {
        self.last_read.lock().get(&thread::current().id()).copied()
    }
}

impl Clock for RecordingClock {
    fn now(&self) -> Instant {
        let now = Instant::now();
        self.last_read.lock().insert(thread::current().id(), now);
        now
    }
}

/// Largest number of grants inside any window of length `interval`.
fn max_in_any_window(mut grants: Vec<Instant>, interval: Duration) -> usize {
    grants.sort();
    let mut max = 0;
    let mut start = 0;
    for end in 0..grants.len() {
        while grants[end] - grants[start] >= interval {
            start += 1;
        }
        max = max.max(end - start + 1);
    }
    max
}

#[test]
fn first_permits_do_not_block() {
    let limiter = RateLimiter::new(5, Duration::from_secs(1)).unwrap();
    let start = Instant::now();
    for _ in 0..5 {
        limiter.acquire();
    }
    assert!(start.elapsed() < Duration::from_millis(10));
}

#[test]
fn second_permit_waits_for_the_interval() {
    let limiter = RateLimiter::new(1, Duration::from_millis(200)).unwrap();

    limiter.acquire();
    let first = Instant::now();
    limiter.acquire();
    let gap = first.elapsed();

    assert!(gap >= Duration::from_millis(195), "gap was {:?}", gap);
    assert!(gap < Duration::from_millis(1_000), "gap was {:?}", gap);
}

#[test]
fn sixth_permit_waits_for_oldest_grant() {
    let interval = Duration::from_millis(300);
    let limiter = RateLimiter::new(5, interval).unwrap();

    let start = Instant::now();
    limiter.acquire();
    thread::sleep(Duration::from_millis(100));
    for _ in 0..4 {
        limiter.acquire();
    }

    // The oldest grant is at ~0ms, so the sixth cannot go before ~300ms
    limiter.acquire();
    let elapsed = start.elapsed();
    assert!(elapsed >= interval, "elapsed {:?}", elapsed);
    assert!(elapsed < interval + Duration::from_millis(90), "elapsed {:?}", elapsed);
}

#[test]
fn concurrent_bursts_respect_the_window() {
    let interval = Duration::from_secs(1);
    let clock = RecordingClock::default();
    let limiter = Arc::new(RateLimiter::with_clock(5, interval, clock.clone()).unwrap());
    let grants = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            let clock = clock.clone();
            let grants = Arc::clone(&grants);
            thread::spawn(move || {
                limiter.acquire();
                let granted_at = clock.last_read_by_current_thread().unwrap();
                grants.lock().push(granted_at);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let grants = grants.lock().clone();
    assert_eq!(grants.len(), 12);
    assert!(max_in_any_window(grants, interval) <= 5);
}

#[test]
fn acquire_many_rejects_more_than_the_limit() {
    let limiter = RateLimiter::new(3, Duration::from_secs(60)).unwrap();
    let start = Instant::now();
    assert_eq!(
        limiter.acquire_many(4),
        Err(RateLimiterError::BeyondCapacity { acquiring: 4, capacity: 3 })
    );
    assert!(start.elapsed() < Duration::from_millis(10));

    assert_eq!(limiter.acquire_many(0), Ok(()));
    assert_eq!(limiter.acquire_many(3), Ok(()));
    assert!(limiter.try_acquire().is_err());
}

#[test]
fn acquire_many_records_a_huge_request() {
    let limiter = RateLimiter::new(Uint::MAX, Duration::from_secs(60)).unwrap();
    assert_eq!(limiter.acquire_many(Uint::MAX / 2), Ok(()));
    assert_eq!(limiter.acquire_many(Uint::MAX / 2), Ok(()));
    assert!(limiter.try_acquire().is_ok());
    assert!(limiter.try_acquire().is_err());
}

#[test]
fn invalid_construction_fails_immediately() {
    let start = Instant::now();
    assert!(matches!(
        RateLimiter::new(0, Duration::from_secs(1)),
        Err(RateLimiterError::InvalidConfiguration { .. })
    ));
    assert!(matches!(
        RateLimiter::new(5, Duration::ZERO),
        Err(RateLimiterError::InvalidConfiguration { .. })
    ));
    assert!(matches!(
        RateLimiter::from_config(&RateLimiterConfig { limit: 0, interval_ms: 1_000 }),
        Err(RateLimiterError::InvalidConfiguration { .. })
    ));
    assert!(start.elapsed() < Duration::from_millis(10));
}

#[test]
fn cancelled_waiter_leaves_no_phantom_grant() {
    let interval = Duration::from_millis(400);
    let limiter = Arc::new(RateLimiter::new(1, interval).unwrap());
    limiter.acquire();
    let first_grant = Instant::now();

    let token = CancelToken::new();
    let waiter = {
        let limiter = Arc::clone(&limiter);
        let token = token.clone();
        thread::spawn(move || limiter.acquire_with_cancel(&token))
    };

    thread::sleep(Duration::from_millis(50));
    token.cancel();
    assert_eq!(waiter.join().unwrap(), Err(RateLimiterError::OperationCancelled));
    assert!(first_grant.elapsed() < interval);

    // Only the first grant is in the log: a fresh caller gets in once it expires
    let wait = limiter.try_acquire().unwrap_err();
    assert!(wait <= interval);
    thread::sleep(wait);
    limiter.acquire();
    assert!(first_grant.elapsed() < interval * 2);
}

#[test]
fn cancel_token_is_ignored_when_a_permit_is_free() {
    let limiter = RateLimiter::new(2, Duration::from_secs(60)).unwrap();
    let token = CancelToken::new();
    token.cancel();

    assert_eq!(limiter.acquire_with_cancel(&token), Ok(()));
    assert_eq!(limiter.acquire_with_cancel(&token), Ok(()));
    assert_eq!(
        limiter.acquire_with_cancel(&token),
        Err(RateLimiterError::OperationCancelled)
    );
}
