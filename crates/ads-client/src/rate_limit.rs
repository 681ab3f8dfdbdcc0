//! Rate limiter for the Google Ads API.
//!
//! Keeps well under the per-developer-token QPS limits.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = GovLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Separate buckets for report queries and mutate calls.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    search_limiter: Arc<DirectLimiter>,
    mutate_limiter: Arc<DirectLimiter>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(
            NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN),
            NonZeroU32::new(5).unwrap_or(NonZeroU32::MIN),
        )
    }

    /// Create with custom per-second limits.
    pub fn with_limits(searches_per_sec: NonZeroU32, mutates_per_sec: NonZeroU32) -> Self {
        Self {
            search_limiter: Arc::new(GovLimiter::direct(Quota::per_second(searches_per_sec))),
            mutate_limiter: Arc::new(GovLimiter::direct(Quota::per_second(mutates_per_sec))),
        }
    }

    /// Wait until a search slot is available.
    pub async fn wait_search(&self) {
        self.search_limiter.until_ready().await;
    }

    /// Wait until a mutate slot is available.
    pub async fn wait_mutate(&self) {
        self.mutate_limiter.until_ready().await;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
