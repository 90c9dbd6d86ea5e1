//! Retry policy for provider calls.
//!
//! Remote providers are only intermittently available: calls can fail on
//! network errors, provider-side throttling, or transient malformed
//! responses. Each provider call site is wrapped in a [`RetryPolicy`].

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{DataError, Result};

/// Total attempts per provider call, counting the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Fixed pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Retry policy applied to a single provider call.
///
/// Runs an operation up to `max_attempts` times with a fixed `delay` between
/// attempts, retrying whenever `retry_if` accepts the error. The default
/// policy retries on any error, since every failure raised by a provider
/// call is treated as transient. When attempts are exhausted the last error
/// is returned; retries are otherwise invisible to the caller.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total attempts, counting the first.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
    /// Predicate deciding whether an error is worth another attempt.
    pub retry_if: fn(&DataError) -> bool,
}

impl RetryPolicy {
    /// Creates a policy retrying on any error.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            retry_if: |_| true,
        }
    }

    /// Replaces the retry predicate.
    #[must_use]
    pub fn with_retry_if(mut self, predicate: fn(&DataError) -> bool) -> Self {
        self.retry_if = predicate;
        self
    }

    /// Runs `op`, retrying per the policy.
    ///
    /// The delay is awaited between attempts, not after the last one.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !(self.retry_if)(&err) {
                        return Err(err);
                    }
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "provider call failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_returns_first_success() {
        let policy = RetryPolicy::new(5, Duration::ZERO);
        let calls = AtomicUsize::new(0);

        let result = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_failures_until_success() {
        let policy = RetryPolicy::new(5, Duration::ZERO);
        let calls = AtomicUsize::new(0);

        let result = policy
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(DataError::Network("connection reset".to_string()))
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error_after_max_attempts() {
        let policy = RetryPolicy::new(5, Duration::ZERO);
        let calls = AtomicUsize::new(0);

        let result: Result<()> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DataError::Network("provider down".to_string())) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        match result.unwrap_err() {
            DataError::Network(msg) => assert_eq!(msg, "provider down"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_predicate_short_circuits() {
        let policy = RetryPolicy::new(5, Duration::ZERO)
            .with_retry_if(|err| matches!(err, DataError::Network(_)));
        let calls = AtomicUsize::new(0);

        let result: Result<()> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DataError::InvalidParameter("bad".to_string())) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(DataError::InvalidParameter(_))));
    }
}
