//! Bounded retry with linear backoff for rate-limited Xero calls.
//!
//! Every remote call in the export pipeline funnels through a
//! [`RetryPolicy`]. A rate-limit response triggers a sleep-and-retry cycle
//! with a delay that grows by a fixed step after each failed attempt; any
//! other error propagates immediately. Exhausting the attempt budget yields
//! `AppError::RetryExhausted` carrying the endpoint, query, and attempt
//! count.
//!
//! The backoff is linear, not exponential: 10s, 20s, 30s, ... with the
//! defaults. Keep it that way unless Xero's limits change.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::AppError;

/// Base delay and growth step between rate-limited attempts.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(10);

/// Maximum executions of the underlying call per logical query.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

// ─────────────────────────────────────────────────────────────────────────────
// RetryPolicy
// ─────────────────────────────────────────────────────────────────────────────

/// Retry budget applied to a single logical Xero call.
///
/// Copy-cheap; the per-call state (attempts so far, current delay) lives on
/// the stack of [`run`](Self::run) and is discarded on success or exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Initial backoff delay; also the amount the delay grows per failure.
    pub base_delay: Duration,
    /// Maximum attempt count, including the first.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given base delay and attempt budget.
    ///
    /// # Panics
    ///
    /// Panics if `max_attempts` is 0.
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        assert!(max_attempts > 0, "max_attempts must be greater than 0");

        Self {
            base_delay,
            max_attempts,
        }
    }

    /// Runs `op`, retrying on rate-limit errors with linear backoff.
    ///
    /// `endpoint` and `query` name the logical operation for error context
    /// and logging only; `op` is the typed callable that actually issues the
    /// request, invoked once per attempt.
    ///
    /// # Errors
    ///
    /// - `AppError::RetryExhausted` - every attempt was rate limited
    /// - anything else `op` returns, unchanged and unretried
    pub async fn run<T, F, Fut>(
        &self,
        endpoint: &str,
        query: &str,
        op: F,
    ) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        self.run_with_sleep(endpoint, query, op, tokio::time::sleep)
            .await
    }

    /// [`run`](Self::run) with an injectable sleep, so tests can observe the
    /// delay sequence without waiting out real backoff.
    pub async fn run_with_sleep<T, F, Fut, S, SFut>(
        &self,
        endpoint: &str,
        query: &str,
        mut op: F,
        mut sleep: S,
    ) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
        S: FnMut(Duration) -> SFut,
        SFut: Future<Output = ()>,
    {
        let mut delay = self.base_delay;
        let mut attempts = 0u32;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(AppError::RateLimited { retry_after_secs }) => {
                    attempts += 1;
                    if attempts >= self.max_attempts {
                        return Err(AppError::RetryExhausted {
                            endpoint: endpoint.to_string(),
                            query: query.to_string(),
                            attempts,
                        });
                    }

                    warn!(
                        "[XERO] Rate limited on {} {} (attempt {}/{}, retry-after {:?}); backing off {:?}",
                        query, endpoint, attempts, self.max_attempts, retry_after_secs, delay
                    );
                    sleep(delay).await;
                    delay += self.base_delay;
                }
                Err(other) => return Err(other),
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
