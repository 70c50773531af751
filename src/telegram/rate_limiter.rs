//! Per-user rate limiter.
//!
//! Caps how many shorten requests a single user may issue within a fixed
//! window, so one chat cannot exhaust the shortener quotas.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

/// Fixed-window counter for one user.
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Rate limiter enforcing a per-user request budget per window.
#[derive(Debug)]
pub struct RateLimiter {
    /// Requests allowed per user per window.
    max_requests: u32,

    /// Window length.
    window: Duration,

    /// Active windows keyed by user id.
    windows: Mutex<HashMap<i64, Window>>,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a limiter with a one-minute window.
    #[must_use]
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Tries to record a request for the user.
    ///
    /// # Errors
    ///
    /// Returns the time until the user's window resets when the budget is
    /// exhausted.
    pub async fn try_acquire(&self, user_id: i64) -> Result<(), Duration> {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();

        let window = windows.entry(user_id).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            let retry_after = self.window - now.duration_since(window.started);
            debug!(
                "Rate limit hit for user {}: retry in {:?}",
                user_id, retry_after
            );
            return Err(retry_after);
        }

        window.count += 1;
        Ok(())
    }

    /// Checks whether the user has budget left, without consuming it.
    pub async fn is_allowed(&self, user_id: i64) -> bool {
        let windows = self.windows.lock().await;
        match windows.get(&user_id) {
            Some(window) => {
                window.count < self.max_requests
                    || window.started.elapsed() >= self.window
            }
            None => true,
        }
    }

    /// Drops windows that have expired, bounding memory over long uptimes.
    pub async fn prune(&self) {
        let mut windows = self.windows.lock().await;
        let window = self.window;
        windows.retain(|_, w| w.started.elapsed() < window);
    }

    /// Clears all windows, allowing immediate requests.
    pub async fn reset(&self) {
        let mut windows = self.windows.lock().await;
        windows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_requests_allowed() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        assert!(limiter.is_allowed(1).await);
        assert!(limiter.try_acquire(1).await.is_ok());
        assert!(limiter.try_acquire(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_budget_exhaustion() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.try_acquire(1).await.is_ok());
        let retry_after = limiter.try_acquire(1).await.unwrap_err();
        assert!(retry_after <= Duration::from_secs(60));
        assert!(!limiter.is_allowed(1).await);
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.try_acquire(1).await.is_ok());
        assert!(limiter.try_acquire(2).await.is_ok());
        assert!(limiter.try_acquire(1).await.is_err());
    }

    #[tokio::test]
    async fn test_window_expiry_resets_budget() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));

        assert!(limiter.try_acquire(1).await.is_ok());
        assert!(limiter.try_acquire(1).await.is_err());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limiter.try_acquire(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_reset() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.try_acquire(1).await.is_ok());
        assert!(limiter.try_acquire(1).await.is_err());

        limiter.reset().await;
        assert!(limiter.try_acquire(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_prune_drops_expired_windows() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));

        assert!(limiter.try_acquire(1).await.is_ok());
        tokio::time::sleep(Duration::from_millis(20)).await;
        limiter.prune().await;

        let windows = limiter.windows.lock().await;
        assert!(windows.is_empty());
    }
}
