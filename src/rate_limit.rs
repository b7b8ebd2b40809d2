//! Rate limiting between mutating API calls
//!
//! The only throttle in the system is a fixed pause after every merge. Time
//! is read and waited on through [`Clock`] so tests can run without real
//! delays.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Source of wall-clock time and sleeping
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;

    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by the system time and `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fixed pause applied after each mutating action
#[derive(Clone)]
pub struct RateLimiter {
    delay: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a limiter pausing `delay` on `clock`
    pub fn new(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { delay, clock }
    }

    /// Limiter on the system clock
    pub fn system(delay: Duration) -> Self {
        Self::new(delay, Arc::new(SystemClock))
    }

    /// Configured pause
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Clock used for waiting and for evaluation timestamps
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Wait out the post-action delay
    pub async fn pause(&self) {
        debug!(delay_secs = self.delay.as_secs_f64(), "rate limit pause");
        self.clock.sleep(self.delay).await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}
