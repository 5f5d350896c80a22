// Minimum-interval rate limiter for hosted classifier calls.
//
// Perspective's free tier allows 1 query per second. Each acquire() waits
// until at least `interval` has passed since the previous request.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Enforces a maximum request rate across clones.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
}

struct RateLimiterInner {
    interval: Duration,
    /// When the last request was allowed through
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Allow `requests_per_second` requests per second.
    pub fn new(requests_per_second: f64) -> Self {
        let interval = Duration::from_secs_f64(1.0 / requests_per_second);
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                interval,
                last_request: None,
            })),
        }
    }

    /// Wait until a request is allowed, then return.
    ///
    /// The lock is held through the sleep so concurrent callers queue up
    /// behind each other instead of all waking at once.
    pub async fn acquire(&self) {
        let mut inner = self.inner.lock().await;

        if let Some(last) = inner.last_request {
            let elapsed = last.elapsed();
            if elapsed < inner.interval {
                tokio::time::sleep(inner.interval - elapsed).await;
            }
        }

        inner.last_request = Some(Instant::now());
    }
}
