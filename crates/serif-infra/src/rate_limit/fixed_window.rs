//! In-memory fixed-window rate limiter.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use serif_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

/// Fixed-window rate limiter configuration.
#[derive(Debug, Clone)]
pub struct FixedWindowConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
    /// Upper bound on tracked keys before stale entries are evicted.
    pub max_keys: usize,
}

impl Default for FixedWindowConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
            max_keys: 10_000,
        }
    }
}

struct Window {
    started: Instant,
    count: u32,
}

/// Counts requests per key in fixed windows: the first request opens a
/// window, every request inside it increments the count, and the count
/// resets when the window elapses.
///
/// Note: limits are per-process, not distributed across instances.
pub struct FixedWindowRateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    config: FixedWindowConfig,
}

impl FixedWindowRateLimiter {
    pub fn new(config: FixedWindowConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn from_env() -> Self {
        let defaults = FixedWindowConfig::default();
        let config = FixedWindowConfig {
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            window: Duration::from_secs(
                std::env::var("RATE_LIMIT_WINDOW_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.window.as_secs()),
            ),
            max_keys: defaults.max_keys,
        };
        Self::new(config)
    }

    async fn check_at(&self, key: &str, now: Instant) -> RateLimitResult {
        let mut windows = self.windows.lock().await;

        if windows.len() >= self.config.max_keys && !windows.contains_key(key) {
            windows.retain(|_, w| now.duration_since(w.started) < self.config.window);
            if windows.len() >= self.config.max_keys {
                // Every tracked key is active. Fail open rather than refuse
                // traffic on limiter pressure.
                tracing::warn!(
                    tracked = windows.len(),
                    "Rate limiter key table full, allowing request untracked"
                );
                return RateLimitResult {
                    allowed: true,
                    remaining: self.config.max_requests,
                    reset_after: self.config.window,
                };
            }
        }

        let window = windows.entry(key.to_owned()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.config.window {
            window.started = now;
            window.count = 0;
        }

        let elapsed = now.duration_since(window.started);
        let reset_after = self.config.window.saturating_sub(elapsed);

        if window.count < self.config.max_requests {
            window.count += 1;
            RateLimitResult {
                allowed: true,
                remaining: self.config.max_requests - window.count,
                reset_after,
            }
        } else {
            RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_after,
            }
        }
    }
}

#[async_trait]
impl RateLimiter for FixedWindowRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(key, Instant::now()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_requests: u32, window_secs: u64, max_keys: usize) -> FixedWindowConfig {
        FixedWindowConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
            max_keys,
        }
    }

    #[tokio::test]
    async fn allows_up_to_the_limit_and_rejects_the_next() {
        let limiter = FixedWindowRateLimiter::new(config(10, 60, 100));
        let now = Instant::now();

        for i in 0..10 {
            let result = limiter.check_at("1.2.3.4", now).await;
            assert!(result.allowed, "request {i} should pass");
            assert_eq!(result.remaining, 10 - (i + 1));
        }

        let eleventh = limiter.check_at("1.2.3.4", now).await;
        assert!(!eleventh.allowed);
        assert_eq!(eleventh.remaining, 0);
        assert!(eleventh.reset_after > Duration::ZERO);
    }

    #[tokio::test]
    async fn window_resets_after_it_elapses() {
        let limiter = FixedWindowRateLimiter::new(config(2, 60, 100));
        let start = Instant::now();

        assert!(limiter.check_at("key", start).await.allowed);
        assert!(limiter.check_at("key", start).await.allowed);
        assert!(!limiter.check_at("key", start).await.allowed);

        let after_window = start + Duration::from_secs(61);
        let fresh = limiter.check_at("key", after_window).await;
        assert!(fresh.allowed);
        assert_eq!(fresh.remaining, 1);
    }

    #[tokio::test]
    async fn keys_are_limited_independently() {
        let limiter = FixedWindowRateLimiter::new(config(1, 60, 100));
        let now = Instant::now();

        assert!(limiter.check_at("1.1.1.1", now).await.allowed);
        assert!(!limiter.check_at("1.1.1.1", now).await.allowed);
        assert!(limiter.check_at("2.2.2.2", now).await.allowed);
    }

    #[tokio::test]
    async fn stale_keys_are_evicted_at_capacity() {
        let limiter = FixedWindowRateLimiter::new(config(1, 60, 2));
        let start = Instant::now();

        assert!(limiter.check_at("old-1", start).await.allowed);
        assert!(limiter.check_at("old-2", start).await.allowed);

        // Both old windows have elapsed, so the new key gets a tracked slot.
        let later = start + Duration::from_secs(61);
        assert!(limiter.check_at("new", later).await.allowed);
        assert!(!limiter.check_at("new", later).await.allowed);
    }

    #[tokio::test]
    async fn fails_open_when_the_key_table_is_full() {
        let limiter = FixedWindowRateLimiter::new(config(1, 60, 1));
        let now = Instant::now();

        assert!(limiter.check_at("tracked", now).await.allowed);

        // "untracked" cannot get a slot while "tracked" is active.
        for _ in 0..5 {
            assert!(limiter.check_at("untracked", now).await.allowed);
        }
    }
}
