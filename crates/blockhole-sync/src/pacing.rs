//! Fixed-interval pacing for destination API calls.

use governor::{Quota, RateLimiter};
use std::time::Duration;
use tracing::trace;

/// Default spacing between paced calls: 300 calls per 5 minutes
pub const DEFAULT_CALL_INTERVAL: Duration = Duration::from_secs(1);

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Spaces calls at least `interval` apart.
///
/// Every state-changing call and follower query waits on [`Pacer::ready`]
/// before it is issued. The first call passes immediately.
pub struct Pacer {
    limiter: Option<DirectLimiter>,
    interval: Duration,
}

impl Pacer {
    /// Pacer allowing one call per `interval`. A zero interval disables pacing.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            limiter: Quota::with_period(interval).map(RateLimiter::direct),
            interval,
        }
    }

    /// Pacer that never waits
    #[must_use]
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next call is allowed
    pub async fn ready(&self) {
        if let Some(limiter) = &self.limiter {
            trace!(interval_ms = self.interval.as_millis(), "waiting for call slot");
            limiter.until_ready().await;
        }
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_INTERVAL)
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer").field("interval", &self.interval).finish()
    }
}
