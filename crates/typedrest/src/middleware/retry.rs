//! Retry middleware with exponential backoff and jitter.
//!
//! The client never retries on its own. Installing [`RetryMiddleware`] re-runs the rest
//! of the chain when it fails in a way that a second attempt could fix.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use typedrest_transport::{HttpRequest, HttpResponse};

use super::{Middleware, Next};
use crate::error::Result;

/// When and how long to wait between attempts.
///
/// Delays grow as `initial_delay * multiplier^attempt`, are capped at `max_delay`, and
/// are then randomized by `±jitter` without exceeding the cap.
///
/// # Default Configuration
///
/// - `max_retries`: 3
/// - `initial_delay`: 500ms
/// - `max_delay`: 60s
/// - `multiplier`: 2.0
/// - `jitter`: 0.1
/// - `retry_statuses`: none (only transport failures are retried)
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: f64,
    retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    /// Create a new builder for configuring a retry policy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typedrest::middleware::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::builder()
    ///     .max_retries(5)
    ///     .initial_delay(Duration::from_millis(100))
    ///     .retry_on_status([502, 503])
    ///     .build();
    /// assert_eq!(policy.max_retries(), 5);
    /// ```
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Maximum retries after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Statuses that trigger a retry in addition to transport failures.
    pub fn retry_statuses(&self) -> &[u16] {
        &self.retry_statuses
    }

    /// Delay before retry number `attempt + 1` (attempt is 0-indexed).
    ///
    /// The exponential base is capped at `max_delay` before jitter is applied, so an
    /// overflowing base settles on `max_delay`. A zero `initial_delay` always yields zero.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        let max_delay = self.max_delay.as_secs_f64();
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base_delay = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped_delay = if base_delay.is_finite() {
            base_delay.clamp(0.0, max_delay)
        } else {
            max_delay
        };

        let jittered = if self.jitter > 0.0 {
            // Uniform in [capped * (1 - jitter), capped * (1 + jitter)]
            capped_delay + capped_delay * self.jitter * (rand::random::<f64>() - 0.5) * 2.0
        } else {
            capped_delay
        };

        Duration::try_from_secs_f64(jittered.clamp(0.0, max_delay)).unwrap_or(self.max_delay)
    }

    /// Whether this outcome of an attempt is worth retrying.
    pub fn should_retry(&self, outcome: &Result<HttpResponse>) -> bool {
        match outcome {
            Ok(response) => self.retry_statuses.contains(&response.status),
            Err(err) => err.is_retryable(),
        }
    }

    /// Server-requested delay, honoured for retried statuses (capped at `max_delay`).
    fn retry_after(&self, outcome: &Result<HttpResponse>) -> Option<Duration> {
        let response = outcome.as_ref().ok()?;
        let seconds = response.header("retry-after")?.trim().parse::<u64>().ok()?;
        Some(Duration::from_secs(seconds).min(self.max_delay))
    }
}

/// Builder for configuring [`RetryPolicy`].
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    max_retries: Option<u32>,
    initial_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<f64>,
    jitter: Option<f64>,
    retry_statuses: Vec<u16>,
}

impl RetryPolicyBuilder {
    /// Set the maximum number of retry attempts.
    ///
    /// Default: 3
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the initial delay before the first retry.
    ///
    /// Default: 500ms
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Set the maximum delay between retries.
    ///
    /// Default: 60s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set the exponential multiplier.
    ///
    /// Default: 2.0 (doubles each time)
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Set the jitter factor (0.0 to 1.0).
    ///
    /// Default: 0.1
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter.clamp(0.0, 1.0));
        self
    }

    /// Also retry responses with these statuses (e.g. 502, 503).
    pub fn retry_on_status(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retry_statuses.extend(statuses);
        self
    }

    /// Build the `RetryPolicy` instance.
    ///
    /// Uses default values for any unset parameters.
    pub fn build(self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries.unwrap_or(3),
            initial_delay: self.initial_delay.unwrap_or(Duration::from_millis(500)),
            max_delay: self.max_delay.unwrap_or(Duration::from_secs(60)),
            multiplier: self.multiplier.unwrap_or(2.0),
            jitter: self.jitter.unwrap_or(0.1),
            retry_statuses: self.retry_statuses,
        }
    }
}

/// Re-runs the inner chain on retryable failures.
///
/// Validation and unexpected-status errors are decided above the chain and are never
/// seen here; only transport failures and the statuses named in the policy trigger a
/// retry.
#[derive(Debug, Clone, Default)]
pub struct RetryMiddleware {
    policy: RetryPolicy,
}

impl RetryMiddleware {
    /// Create the middleware with `policy`.
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// The policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl Middleware for RetryMiddleware {
    fn name(&self) -> &'static str {
        "retry"
    }

    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        let mut attempt = 0;
        loop {
            let outcome = next.run(request.clone()).await;

            if attempt >= self.policy.max_retries || !self.policy.should_retry(&outcome) {
                if attempt > 0 {
                    debug!(
                        url = %request.url,
                        attempts = attempt + 1,
                        succeeded = outcome.is_ok(),
                        "Retry loop finished"
                    );
                }
                return outcome;
            }

            let delay = self
                .policy
                .retry_after(&outcome)
                .unwrap_or_else(|| self.policy.next_delay(attempt));

            match &outcome {
                Ok(response) => warn!(
                    url = %request.url,
                    status = response.status,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis(),
                    "Retrying request after retryable status"
                ),
                Err(err) => warn!(
                    url = %request.url,
                    error = %err,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis(),
                    "Retrying request after transport failure"
                ),
            }

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
