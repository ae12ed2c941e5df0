//! Per-client request quota tracking with fixed-window counting.
//!
//! This module implements the quota core used by the rate-limiting
//! middleware: every client key owns up to [`QuotaLimiter::limit`] points
//! per accounting window, one point per accepted request. When a key's
//! points are exhausted, further consumption attempts are rejected until
//! the window expires.
//!
//! # Design
//!
//! - **Fixed-window counting**: the full allowance resets at discrete
//!   window boundaries rather than leaking back continuously. A client can
//!   therefore burst up to `2 * limit` requests straddling a window edge;
//!   this is an accepted property of the strategy.
//! - **Lazy expiry**: window expiry is evaluated on the next access to a
//!   key, never via per-key timers. A single [`QuotaLimiter::purge_expired`]
//!   sweep reclaims records for keys that went quiet.
//! - **Per-key atomicity**: check-and-consume happens under the concurrent
//!   map's entry guard, so two in-flight requests for the same key cannot
//!   both succeed on a single remaining point.
//!
//! The limiter is an explicit instance carried in application state, not a
//! process-global; each test constructs its own.
//!
//! # Example
//!
//! ```
//! use contentpulse::limiter::{QuotaDecision, QuotaLimiter};
//! use std::time::Duration;
//!
//! let limiter = QuotaLimiter::new(2, Duration::from_secs(60));
//! assert_eq!(limiter.consume("1.2.3.4"), QuotaDecision::Allowed);
//! assert_eq!(limiter.consume("1.2.3.4"), QuotaDecision::Allowed);
//! assert!(matches!(limiter.consume("1.2.3.4"), QuotaDecision::Rejected(_)));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default points per window.
pub const DEFAULT_POINTS: u32 = 100;

/// Default accounting window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Shared bucket key for requests with no resolvable client identifier.
///
/// All unidentified clients consume from this single bucket. That is a
/// deliberate simplification, not a security feature.
pub const ANONYMOUS_KEY: &str = "anonymous";

/// Outcome of a single consumption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    /// The key had capacity; one point was consumed.
    Allowed,
    /// The key is exhausted for the current window.
    Rejected(QuotaExceeded),
}

/// Rejection details for an exhausted key.
///
/// Carries everything the HTTP layer needs to render quota headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaExceeded {
    /// Points left after the failed attempt (always 0 in this design).
    pub remaining_points: u32,
    /// Milliseconds until the window resets and a point becomes available.
    pub ms_before_next: u64,
}

impl QuotaExceeded {
    /// Seconds a client should wait before retrying, rounded to the
    /// nearest second with a floor of 1.
    ///
    /// Never advertises a zero or negative retry delay.
    #[must_use]
    pub fn retry_after_secs(&self) -> u64 {
        ((self.ms_before_next + 500) / 1000).max(1)
    }
}

/// One accounting window for one client key.
#[derive(Debug)]
struct QuotaRecord {
    /// Points consumed within the current window.
    consumed: u32,
    /// When the current window opened.
    window_start: Instant,
}

struct LimiterInner {
    points: u32,
    window: Duration,
    records: DashMap<String, QuotaRecord>,
}

/// In-memory per-key quota limiter.
///
/// Cheap to clone; clones share the same quota table. State is
/// process-local and non-persistent: a restart resets all quotas, and
/// nothing is shared across processes. Horizontally scaled deployments
/// need an externalized store behind the same interface.
#[derive(Clone)]
pub struct QuotaLimiter {
    inner: Arc<LimiterInner>,
}

impl QuotaLimiter {
    /// Create a limiter allowing `points` consumptions per `window`.
    #[must_use]
    pub fn new(points: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(LimiterInner {
                points,
                window,
                records: DashMap::new(),
            }),
        }
    }

    /// Create a limiter with the default 100 points per 60 seconds.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_POINTS, DEFAULT_WINDOW)
    }

    /// The configured points per window.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.inner.points
    }

    /// The configured accounting window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Attempt to consume one point for `key`.
    ///
    /// Creates the key's record lazily on first sight. An expired window is
    /// reset in place before the attempt, so recovery from exhaustion is
    /// time-driven but evaluated here rather than by a timer.
    ///
    /// The record stays locked for the whole check-and-consume, which is
    /// what upholds the "at most `limit` successes per key per window"
    /// invariant under concurrent requests.
    #[must_use]
    pub fn consume(&self, key: &str) -> QuotaDecision {
        let now = Instant::now();
        let mut record = self
            .inner
            .records
            .entry(key.to_string())
            .or_insert_with(|| QuotaRecord {
                consumed: 0,
                window_start: now,
            });

        if now.saturating_duration_since(record.window_start) >= self.inner.window {
            record.consumed = 0;
            record.window_start = now;
        }

        if record.consumed < self.inner.points {
            record.consumed += 1;
            QuotaDecision::Allowed
        } else {
            let elapsed = now.saturating_duration_since(record.window_start);
            let until_reset = self.inner.window.saturating_sub(elapsed);
            QuotaDecision::Rejected(QuotaExceeded {
                remaining_points: self.inner.points.saturating_sub(record.consumed),
                ms_before_next: u64::try_from(until_reset.as_millis()).unwrap_or(u64::MAX),
            })
        }
    }

    /// Number of keys currently holding a quota record.
    ///
    /// Exposed as a health gauge; includes records whose window has expired
    /// but has not been swept yet.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.inner.records.len()
    }

    /// Drop records whose window has fully expired.
    ///
    /// Keys seen again after a sweep simply get a fresh record, so this is
    /// purely memory reclamation and safe to run at any cadence.
    pub fn purge_expired(&self) {
        let window = self.inner.window;
        self.inner
            .records
            .retain(|_, record| record.window_start.elapsed() < window);
    }
}

impl std::fmt::Debug for QuotaLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaLimiter")
            .field("points", &self.inner.points)
            .field("window", &self.inner.window)
            .field("tracked_keys", &self.inner.records.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = QuotaLimiter::new(3, Duration::from_secs(60));

        for _ in 0..3 {
            assert_eq!(limiter.consume("1.2.3.4"), QuotaDecision::Allowed);
        }
        assert!(matches!(
            limiter.consume("1.2.3.4"),
            QuotaDecision::Rejected(_)
        ));
    }

    #[test]
    fn test_rejection_reports_zero_remaining() {
        let limiter = QuotaLimiter::new(1, Duration::from_secs(60));
        let _ = limiter.consume("k");

        match limiter.consume("k") {
            QuotaDecision::Rejected(exceeded) => {
                assert_eq!(exceeded.remaining_points, 0);
                assert!(exceeded.ms_before_next <= 60_000);
            }
            QuotaDecision::Allowed => panic!("second consume should be rejected"),
        }
    }

    #[test]
    fn test_keys_are_accounted_independently() {
        let limiter = QuotaLimiter::new(2, Duration::from_secs(60));

        let _ = limiter.consume("a");
        let _ = limiter.consume("a");
        assert!(matches!(limiter.consume("a"), QuotaDecision::Rejected(_)));

        // Exhausting "a" must not cost "b" anything
        assert_eq!(limiter.consume("b"), QuotaDecision::Allowed);
    }

    #[test]
    fn test_window_expiry_restores_capacity() {
        let limiter = QuotaLimiter::new(1, Duration::from_millis(30));

        assert_eq!(limiter.consume("k"), QuotaDecision::Allowed);
        assert!(matches!(limiter.consume("k"), QuotaDecision::Rejected(_)));

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(limiter.consume("k"), QuotaDecision::Allowed);
    }

    #[test]
    fn test_retry_after_has_floor_of_one_second() {
        let exceeded = QuotaExceeded {
            remaining_points: 0,
            ms_before_next: 120,
        };
        assert_eq!(exceeded.retry_after_secs(), 1);

        let exceeded = QuotaExceeded {
            remaining_points: 0,
            ms_before_next: 59_600,
        };
        assert_eq!(exceeded.retry_after_secs(), 60);
    }

    #[test]
    fn test_retry_after_rounds_to_nearest_second() {
        let exceeded = QuotaExceeded {
            remaining_points: 0,
            ms_before_next: 1_499,
        };
        assert_eq!(exceeded.retry_after_secs(), 1);

        let exceeded = QuotaExceeded {
            remaining_points: 0,
            ms_before_next: 1_500,
        };
        assert_eq!(exceeded.retry_after_secs(), 2);
    }

    #[test]
    fn test_purge_drops_only_expired_records() {
        let limiter = QuotaLimiter::new(5, Duration::from_millis(30));

        let _ = limiter.consume("stale");
        std::thread::sleep(Duration::from_millis(40));
        let _ = limiter.consume("fresh");

        limiter.purge_expired();
        assert_eq!(limiter.tracked_keys(), 1);

        // A purged key simply starts a fresh window
        assert_eq!(limiter.consume("stale"), QuotaDecision::Allowed);
    }

    #[test]
    fn test_concurrent_consumption_never_over_admits() {
        let limiter = QuotaLimiter::new(100, Duration::from_secs(60));
        let threads = 8;
        let attempts_per_thread = 50;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    let mut allowed = 0_u32;
                    for _ in 0..attempts_per_thread {
                        if limiter.consume("shared") == QuotaDecision::Allowed {
                            allowed += 1;
                        }
                    }
                    allowed
                })
            })
            .collect();

        let total_allowed: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total_allowed, 100);
    }
}
