use std::{fmt::Display, future::Future, time::Duration};

use tracing::warn;

/// Fixed-delay retry. `attempts` counts the first call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 2;

    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

/// Runs `op` until it succeeds, `should_retry` rejects the error, or the
/// attempts run out. Returns the last error.
pub async fn retry_async<T, E, F, Fut, P>(
    policy: RetryPolicy,
    context: &str,
    should_retry: P,
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.attempts && should_retry(&err) => {
                warn!(
                    attempt,
                    max_attempts = policy.attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %err,
                    "retry: {context} failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn stops_after_configured_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry_async(quick(2), "op", |_| true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("boom".to_string()) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_attempt_can_succeed() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = retry_async(quick(2), "op", |_| true, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err("transient".to_string())
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn non_retryable_error_is_returned_immediately() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry_async(quick(3), "op", |_| false, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("fatal".to_string()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
