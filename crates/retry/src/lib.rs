//! Bounded Retry
//!
//! A reusable retry combinator: a maximum attempt count, a fixed interval
//! between attempts, and a predicate deciding which errors are worth
//! another attempt. Errors the predicate rejects abort immediately without
//! consuming further attempts.
//!
//! # Example
//!
//! ```no_run
//! use bounded_retry::{retry, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let policy = RetryPolicy::fixed(40, Duration::from_secs(3));
//! let result = retry(&policy, "master discovery", |e: &String| e.contains("not ready"), |attempt| async move {
//!     if attempt < 3 { Err("not ready".to_string()) } else { Ok(attempt) }
//! })
//! .await;
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Retry budget and pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (not retries)
    pub max_attempts: u32,
    /// Sleep after each failed attempt but the last
    pub interval: Duration,
}

impl RetryPolicy {
    /// Fixed-interval policy
    #[must_use]
    pub const fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound of the total time spent sleeping under this policy
    #[must_use]
    pub fn total_sleep(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts.saturating_sub(1))
    }
}

/// Terminal outcome of a failed retry loop
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error
    #[error("{operation} did not succeed after {attempts} attempts{}", describe_last(.last))]
    Exhausted {
        /// Operation name used in logs
        operation: String,
        /// Attempts made
        attempts: u32,
        /// Last retryable error observed
        last: Option<E>,
    },

    /// A non-retryable error ended the loop
    #[error(transparent)]
    Aborted(E),
}

fn describe_last<E: fmt::Display>(last: &Option<E>) -> String {
    match last {
        Some(e) => format!(": {e}"),
        None => String::new(),
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the attempt budget is spent.
///
/// `operation` receives the 1-based attempt number. The interval is slept only
/// between attempts, never after the last one.
pub async fn retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    name: &str,
    is_retryable: P,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: fmt::Display,
{
    let mut last = None;

    for attempt in 1..=policy.max_attempts {
        match operation(attempt).await {
            Ok(value) => {
                debug!(operation = name, attempt, "Succeeded");
                return Ok(value);
            }
            Err(e) if !is_retryable(&e) => {
                debug!(operation = name, attempt, error = %e, "Non-retryable failure");
                return Err(RetryError::Aborted(e));
            }
            Err(e) => {
                warn!(
                    operation = name,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Attempt failed, will retry"
                );
                last = Some(e);
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.interval).await;
                }
            }
        }
    }

    Err(RetryError::Exhausted {
        operation: name.to_string(),
        attempts: policy.max_attempts,
        last,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Debug, PartialEq)]
    enum TestError {
        NotYet,
        Broken,
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::NotYet => write!(f, "not yet"),
                Self::Broken => write!(f, "broken"),
            }
        }
    }

    impl std::error::Error for TestError {}

    fn retryable(e: &TestError) -> bool {
        *e == TestError::NotYet
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_after_transient_failures() {
        let policy = RetryPolicy::fixed(5, Duration::from_secs(3));
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = retry(&policy, "test", retryable, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 { Err(TestError::NotYet) } else { Ok(attempt) }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausts_budget() {
        let policy = RetryPolicy::fixed(4, Duration::from_secs(2));
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), _> = retry(&policy, "test", retryable, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::NotYet) }
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::Exhausted { attempts: 4, .. }));
        assert_eq!(err.to_string(), "test did not succeed after 4 attempts: not yet");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(start.elapsed() <= policy.total_sleep());
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_aborts_on_non_retryable_error() {
        let policy = RetryPolicy::fixed(10, Duration::from_secs(2));
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), _> = retry(&policy, "test", retryable, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Broken) }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Aborted(TestError::Broken))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_attempts_is_exhausted_immediately() {
        let policy = RetryPolicy::fixed(0, Duration::from_secs(1));
        let result: Result<(), RetryError<TestError>> =
            retry(&policy, "test", retryable, |_| async { Ok(()) }).await;
        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 0, last: None, .. })));
    }
}
