//! Shared exponential-backoff retry helper (spec §4.5.6, §4.6.3, §4.8).
//!
//! Grounded on the teacher's `fraiseql_observers::job_queue::backoff`
//! module: `delay = min(initial * 2^(attempt-1), max)`, generalized here
//! into a retry loop shared by the read path and the commit path.

use std::time::Duration;

use storeio_error::StoreError;
use tracing::warn;

/// Backoff/retry policy: exponential, capped at `max_delay`, giving up
/// after `max_retries` retries (so `max_retries + 1` total attempts).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_retries: u32,
}

impl RetryPolicy {
    /// spec §4.5.6 / §4.6.3: initial 5s, up to 5 retries, uncapped
    /// doubling (the spec never exercises a delay long enough to need an
    /// explicit ceiling, but one is kept for safety).
    #[must_use]
    pub const fn spec_default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(5 * 60),
            max_retries: 5,
        }
    }

    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let millis = self
            .initial_delay
            .as_millis()
            .saturating_mul(1u128 << exponent)
            .min(self.max_delay.as_millis());
        Duration::from_millis(millis as u64)
    }
}

/// Sleeper abstraction so tests can run the retry loop without waiting
/// in real time.
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps using `tokio::time::sleep` — what every non-test caller uses.
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs `attempt` up to `policy.max_retries + 1` times, retrying on any
/// error for which `StoreError::is_retryable` is true and backing off
/// between attempts. Non-retryable errors and retry exhaustion propagate
/// immediately (spec §4.5.6 / §7).
pub async fn retry<T, F, Fut>(
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
    mut attempt: F,
) -> Result<T, StoreError>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, StoreError>>,
{
    let mut attempt_no = 1;
    loop {
        match attempt(attempt_no).await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) if attempt_no > policy.max_retries => return Err(err),
            Err(err) => {
                let delay = policy.delay_for_attempt(attempt_no);
                warn!(
                    attempt = attempt_no,
                    code = %err.code,
                    delay_ms = delay.as_millis() as u64,
                    "retrying store RPC after transient error"
                );
                sleeper.sleep(delay).await;
                attempt_no += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use storeio_error::StatusCode;

    struct NoopSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    impl NoopSleeper {
        fn new() -> Self {
            Self { slept: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait::async_trait]
    impl Sleeper for NoopSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_without_sleeping() {
        let sleeper = NoopSleeper::new();
        let result: Result<i32, StoreError> =
            retry(RetryPolicy::spec_default(), &sleeper, |_| async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn retries_transient_errors_then_succeeds() {
        let sleeper = NoopSleeper::new();
        let calls = AtomicU32::new(0);
        let result: Result<i32, StoreError> = retry(RetryPolicy::spec_default(), &sleeper, |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(StoreError::new(StatusCode::Unavailable, "retry me"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(sleeper.slept.lock().unwrap().len(), 1);
        assert_eq!(sleeper.slept.lock().unwrap()[0], Duration::from_secs(5));
    }

    #[tokio::test]
    async fn does_not_retry_non_retryable_errors() {
        let sleeper = NoopSleeper::new();
        let calls = AtomicU32::new(0);
        let result: Result<i32, StoreError> = retry(RetryPolicy::spec_default(), &sleeper, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::new(StatusCode::PermissionDenied, "nope")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let sleeper = NoopSleeper::new();
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy { max_retries: 2, ..RetryPolicy::spec_default() };
        let result: Result<i32, StoreError> = retry(policy, &sleeper, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::new(StatusCode::Unavailable, "down")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn delay_doubles_and_caps() {
        let policy = RetryPolicy::spec_default();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(10));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(20));
    }
}
