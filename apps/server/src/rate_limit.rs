//! Per-user token bucket for the gift-send endpoint.

use std::time::Instant;

use dashmap::DashMap;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Leaky-bucket limiter keyed by user id. Allows short bursts up to the
/// per-minute allowance, refilling continuously.
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    capacity: f64,
    refill_per_sec: f64,
}

impl RateLimiter {
    pub fn per_minute(events: u32) -> Self {
        let capacity = f64::from(events.max(1));
        Self {
            buckets: DashMap::new(),
            capacity,
            refill_per_sec: capacity / 60.0,
        }
    }

    /// Takes one token for the key; `false` means rate-limited.
    pub fn try_acquire(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut bucket = self.buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.capacity,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_burst_then_limits() {
        let limiter = RateLimiter::per_minute(10);
        for _ in 0..10 {
            assert!(limiter.try_acquire("u1"));
        }
        assert!(!limiter.try_acquire("u1"));
        // Other users are unaffected.
        assert!(limiter.try_acquire("u2"));
    }
}
