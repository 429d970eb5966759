//! Exponential backoff over transport errors and 429/5xx responses,
//! grounded on the teacher's `internals::retry::RetryPolicy` shape but
//! retuned to this system's exact numbers: 1s/2s/4s delays capped at 60s,
//! three attempts total, 4xx (other than 429) never retried.

use crate::error::AppError;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let seconds = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powi((attempt - 1) as i32);
        let capped = seconds.min(self.max_delay.as_secs_f64());
        let jitter = fastrand::f64() * 0.1;
        Duration::from_secs_f64(capped * (1.0 + jitter))
    }
}

/// 4xx (other than rate-limit) is non-retryable; everything else
/// transport/5xx-shaped is.
pub fn is_retryable(error: &AppError) -> bool {
    matches!(
        error,
        AppError::LlmRequestFailed(_)
            | AppError::NetworkError(_)
            | AppError::TimeoutError(_)
            | AppError::RateLimitExceeded { .. }
    )
}

pub async fn run_with_retry<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts && is_retryable(&err) => {
                let delay = policy.calculate_delay(attempt);
                tracing::debug!(attempt, delay_ms = delay.as_millis(), error = %err, "retrying LLM request");
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_errors_up_to_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
        };
        let calls = AtomicU32::new(0);
        let result: Result<(), AppError> = run_with_retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::NetworkError("boom".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_bad_request() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let result: Result<(), AppError> = run_with_retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::BadRequest("nope".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
