//! In-memory fixed-window rate limiting.
//!
//! One `RateLimiter` instance is held per endpoint so buckets never collide
//! across endpoints. State is process-local and lost on restart: the only
//! purpose here is coarse abuse damping, not correctness-critical accounting.
//! Behind multiple instances each process enforces its own window, so this
//! only limits correctly behind a single instance or sticky routing.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Request policy for one endpoint: how many requests per window.
#[derive(Debug, Clone, Copy)]
pub struct RatePolicy {
    pub max_requests: u32,
    pub window: Duration,
}

/// Lead intake: 5 requests per minute per client.
pub const LEAD_POLICY: RatePolicy = RatePolicy {
    max_requests: 5,
    window: Duration::from_secs(60),
};

/// Callback requests: 3 per 5 minutes per client.
pub const CALLBACK_POLICY: RatePolicy = RatePolicy {
    max_requests: 3,
    window: Duration::from_secs(300),
};

/// Chat triage: 10 per minute per client.
pub const CHAT_POLICY: RatePolicy = RatePolicy {
    max_requests: 10,
    window: Duration::from_secs(60),
};

/// One counting window for one client key.
#[derive(Debug)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by caller-supplied identifier (here,
/// client IP; un-identifiable clients all share the `"unknown"` bucket).
///
/// Safe to call from concurrent request handlers: the read-modify-write of a
/// window is guarded by the map mutex. Never errors.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and record one request for `key`.
    ///
    /// Starts a fresh window (count 1) if the key is unseen or its previous
    /// window has elapsed. Otherwise increments while under `max_requests`
    /// and denies at the limit without incrementing further.
    pub fn allow(&self, key: &str, max_requests: u32, window: Duration) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock();

        match windows.get_mut(key) {
            Some(record) if now <= record.reset_at => {
                if record.count >= max_requests {
                    return false;
                }
                record.count += 1;
                true
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                true
            }
        }
    }

    /// `allow` with a policy constant.
    pub fn allow_policy(&self, key: &str, policy: RatePolicy) -> bool {
        self.allow(key, policy.max_requests, policy.window)
    }
}

/// The per-endpoint limiter instances shared through app state.
#[derive(Debug, Default)]
pub struct EndpointLimits {
    pub lead: RateLimiter,
    pub callback: RateLimiter,
    pub chat: RateLimiter,
}
