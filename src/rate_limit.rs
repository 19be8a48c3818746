//! Minimum spacing between upstream requests.

use std::time::Duration;

use tokio::time::Instant;

/// Tracks the last successful request and delays the next one until
/// `min_interval` has passed since it.
///
/// Failed requests are not recorded, so a retry after an error is never
/// delayed by the failure itself.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_success: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_success: None,
        }
    }

    /// How long a request issued at `now` must still wait.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.last_success?;
        let elapsed = now.saturating_duration_since(last);
        self.min_interval
            .checked_sub(elapsed)
            .filter(|wait| !wait.is_zero())
    }

    /// Sleep until a request may be issued.
    pub async fn wait(&self) {
        if let Some(wait) = self.remaining(Instant::now()) {
            tracing::info!(wait_ms = wait.as_millis() as u64, "Rate limit: waiting");
            tokio::time::sleep(wait).await;
        }
    }

    /// Record a successful request at the current instant.
    pub fn mark_success(&mut self) {
        self.last_success = Some(Instant::now());
    }

    pub fn last_success(&self) -> Option<Instant> {
        self.last_success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(5);

    #[tokio::test(start_paused = true)]
    async fn first_request_is_immediate() {
        let limiter = RateLimiter::new(INTERVAL);
        let start = Instant::now();
        limiter.wait().await;
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_out_the_interval_after_success() {
        let mut limiter = RateLimiter::new(INTERVAL);
        limiter.mark_success();
        let marked = Instant::now();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(limiter.remaining(Instant::now()), Some(Duration::from_secs(3)));

        limiter.wait().await;
        assert!(Instant::now() - marked >= INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn no_wait_once_interval_elapsed() {
        let mut limiter = RateLimiter::new(INTERVAL);
        limiter.mark_success();
        tokio::time::advance(Duration::from_secs(6)).await;

        let before = Instant::now();
        limiter.wait().await;
        assert_eq!(Instant::now(), before);
        assert_eq!(limiter.remaining(before), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unrecorded_failures_do_not_delay() {
        let limiter = RateLimiter::new(INTERVAL);
        // A failed request never calls mark_success.
        assert!(limiter.last_success().is_none());
        assert_eq!(limiter.remaining(Instant::now()), None);
    }
}
