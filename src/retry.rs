//! Rate-limit-aware retry for external calls.
//!
//! Wraps a fallible async call and retries only on rate-limit signals. The
//! wait prefers the API's reset instant when the header was present,
//! otherwise falls back to exponential backoff. Implemented as a bounded
//! loop with an attempt counter, never recursion, so the retry count is
//! independently testable. All other errors propagate immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Retry behavior for rate-limited calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Backoff for the first retry; doubles per attempt.
    pub base_delay: Duration,
    /// Cap on any single wait, including header-derived waits.
    pub max_delay: Duration,
    /// Slack added after the reset instant before retrying.
    pub reset_buffer: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            reset_buffer: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `attempt` (1-based) given an optional
    /// reset instant in epoch seconds.
    fn wait_for(&self, attempt: u32, reset_at: Option<i64>) -> Duration {
        let wait = match reset_at {
            Some(reset) => {
                let now = chrono::Utc::now().timestamp();
                let until_reset = reset.saturating_sub(now).max(0) as u64;
                Duration::from_secs(until_reset) + self.reset_buffer
            }
            None => self.base_delay.saturating_mul(1u32 << (attempt - 1).min(16)),
        };
        wait.min(self.max_delay)
    }
}

/// Run `op`, retrying on [`FetchError::RateLimited`] per the policy.
///
/// # Errors
///
/// - [`FetchError::RateLimitExceeded`] once `max_attempts` rate-limited
///   attempts have been made, carrying the attempt count.
/// - Any non-rate-limit error from `op`, immediately and unretried.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, op: F) -> Result<T, FetchError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(FetchError::RateLimited { reset_at }) => {
                if attempt == max_attempts {
                    return Err(FetchError::RateLimitExceeded {
                        attempts: max_attempts,
                    });
                }
                tokio::time::sleep(policy.wait_for(attempt, reset_at)).await;
            }
            Err(other) => return Err(other),
        }
    }

    unreachable!("loop always returns")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            reset_buffer: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn succeeds_after_rate_limit_retries() {
        let calls = AtomicU32::new(0);
        let result = with_retry(fast_policy(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(FetchError::RateLimited { reset_at: None })
                } else {
                    Ok(42u64)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_reports_attempt_count() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(fast_policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FetchError::RateLimited { reset_at: None }) }
        })
        .await;
        match result {
            Err(FetchError::RateLimitExceeded { attempts }) => assert_eq!(attempts, 3),
            other => panic!("expected RateLimitExceeded, got {:?}", other.err()),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_rate_limit_errors_propagate_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(fast_policy(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(FetchError::RepositoryNotFound(
                    "octo/missing".to_string(),
                ))
            }
        })
        .await;
        assert!(matches!(result, Err(FetchError::RepositoryNotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn waits_are_capped_by_max_delay() {
        // Reset instant far in the future must be clamped to max_delay so
        // the pipeline cannot stall indefinitely.
        let policy = fast_policy(2);
        let far_future = chrono::Utc::now().timestamp() + 3_600;
        let wait = policy.wait_for(1, Some(far_future));
        assert!(wait <= policy.max_delay);
    }

    #[tokio::test]
    async fn elapsed_reset_instant_waits_only_the_buffer() {
        let policy = fast_policy(2);
        let past = chrono::Utc::now().timestamp() - 100;
        let wait = policy.wait_for(1, Some(past));
        assert_eq!(wait, policy.reset_buffer);
    }
}
