//! Middleware that adds rate limiting.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use typedrest_transport::{HttpRequest, HttpResponse};

use super::{Middleware, Next};
use crate::error::Result;

/// Token-bucket rate limiter shared by every request through the client.
///
/// Requests over the budget wait; they are never rejected.
#[derive(Clone)]
pub struct RateLimitMiddleware {
    governor: Arc<DefaultDirectRateLimiter>,
}

impl RateLimitMiddleware {
    /// Create a new rate limit middleware.
    ///
    /// Fractional rates are honoured: 2.5 admits one request every 400ms and 0.5 one
    /// every 2s. A rate that is 0, negative or not finite defaults to 1 request per second.
    pub fn new(requests_per_second: f64) -> Self {
        Self::with_burst(requests_per_second, 0)
    }

    /// Like [`new`](Self::new), allowing `burst` requests through back to back.
    ///
    /// A `burst` of 0 means one second's worth of requests, and at least one.
    pub fn with_burst(requests_per_second: f64, burst: u32) -> Self {
        Self {
            governor: Arc::new(RateLimiter::direct(quota_for(requests_per_second, burst))),
        }
    }
}

fn quota_for(requests_per_second: f64, burst: u32) -> Quota {
    let rate = if requests_per_second.is_finite() && requests_per_second > 0.0 {
        requests_per_second
    } else {
        1.0
    };
    let whole = NonZeroU32::new(rate.min(f64::from(u32::MAX)) as u32).unwrap_or(NonZeroU32::MIN);

    // Periods too short or too long for `Duration` fall back to whole requests per second
    let quota = Duration::try_from_secs_f64(rate.recip())
        .ok()
        .and_then(Quota::with_period)
        .unwrap_or_else(|| Quota::per_second(whole));

    quota.allow_burst(NonZeroU32::new(burst).unwrap_or(whole))
}

impl std::fmt::Debug for RateLimitMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitMiddleware").finish_non_exhaustive()
    }
}

#[async_trait]
impl Middleware for RateLimitMiddleware {
    fn name(&self) -> &'static str {
        "rate-limit"
    }

    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        // Wait until we can proceed
        self.governor.until_ready().await;
        next.run(request).await
    }
}
