//! Client-side request throttling.
//!
//! Latch does not currently enforce a rate limit on its API. We cap ourselves
//! at [`LATCH_API_RATE`] anyway so that no single client is the reason one gets
//! introduced. Requests over the limit are delayed, never rejected.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// A number of requests allowed within a sliding time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestRate {
    pub limit: usize,
    pub interval: Duration,
}

/// The self-imposed rate limit for Latch API requests: 10 per second.
pub const LATCH_API_RATE: RequestRate = RequestRate {
    limit: 10,
    interval: Duration::from_secs(1),
};

/// Sliding-window limiter shared by every request made through one client.
#[derive(Debug)]
pub struct RateLimiter {
    rate: RequestRate,
    sent: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(rate: RequestRate) -> Self {
        Self {
            rate,
            sent: Mutex::new(VecDeque::with_capacity(rate.limit)),
        }
    }

    pub fn rate(&self) -> RequestRate {
        self.rate
    }

    /// Wait until a request may be sent, then record it against the window.
    pub async fn acquire(&self) {
        loop {
            let wake_at = {
                let mut sent = self.sent.lock().await;
                let now = Instant::now();
                while let Some(&oldest) = sent.front() {
                    if now.duration_since(oldest) >= self.rate.interval {
                        sent.pop_front();
                    } else {
                        break;
                    }
                }
                if sent.len() < self.rate.limit.max(1) {
                    sent.push_back(now);
                    return;
                }
                match sent.front() {
                    Some(&oldest) => oldest + self.rate.interval,
                    None => now,
                }
            };
            let wait = wake_at.saturating_duration_since(Instant::now());
            debug!(wait_ms = wait.as_millis() as u64, "rate limit reached; delaying request");
            sleep_until(wake_at).await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(LATCH_API_RATE)
    }
}
