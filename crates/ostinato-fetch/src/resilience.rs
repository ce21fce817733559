//! Resilience primitives for the upstream clients.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration};

/// Per-service rate limiter.
///
/// Serializes requests through a single-permit [`Semaphore`] and holds
/// each slot for a fixed interval, capping throughput at the configured
/// requests per second. Last.fm allows 5 req/s for non-commercial use;
/// Spotify search is limited similarly.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    interval: Duration,
}

impl RateLimiter {
    /// Creates a `RateLimiter` allowing at most `requests_per_second`
    /// requests per second.
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            interval: Duration::from_millis(1000 / u64::from(requests_per_second)),
        }
    }

    /// Waits until a request slot is available, then holds the slot for
    /// the configured interval to enforce the rate limit.
    pub async fn acquire(&self) {
        // `acquire` only returns `Err` when the semaphore is closed,
        // which we never do.
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("rate-limiter semaphore unexpectedly closed");
        sleep(self.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_enforces_spacing() {
        let limiter = RateLimiter::new(100);
        let start = tokio::time::Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        // Two acquisitions at 100 req/s must take at least ~20ms.
        assert!(start.elapsed() >= Duration::from_millis(18));
    }
}
