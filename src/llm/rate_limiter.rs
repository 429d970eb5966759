//! Token-bucket rate limiting in front of the LLM transport, built on
//! `governor` (declared in the teacher's dependency table but unused there
//! — this is its first real call site in this codebase).

use crate::error::AppError;
use governor::clock::Clock;
use governor::{Quota, RateLimiter as GovernorLimiter};
use std::num::NonZeroU32;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct RateLimiter {
    inner: GovernorLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    acquire_ceiling: Duration,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32, acquire_ceiling: Duration) -> Self {
        let per_minute = NonZeroU32::new(requests_per_minute.max(1)).unwrap();
        let quota = Quota::per_minute(per_minute).allow_burst(per_minute);
        Self {
            inner: GovernorLimiter::direct(quota),
            acquire_ceiling,
        }
    }

    /// Blocks until a token is available, up to `acquire_ceiling`, then
    /// fails with `RateLimitExceeded`. Cancellation aborts the wait and
    /// does not consume a token.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), AppError> {
        let clock = governor::clock::DefaultClock::default();
        let wait = async {
            loop {
                match self.inner.check() {
                    Ok(()) => return,
                    Err(not_until) => {
                        let wait_time = not_until.wait_time_from(clock.now());
                        tokio::time::sleep(wait_time).await;
                    }
                }
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                Err(AppError::InternalError("rate limiter wait cancelled".to_string()))
            }
            result = tokio::time::timeout(self.acquire_ceiling, wait) => {
                result.map_err(|_| AppError::RateLimitExceeded {
                    retry_after_secs: self.acquire_ceiling.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_burst_up_to_capacity() {
        let limiter = RateLimiter::new(60, Duration::from_secs(1));
        let cancel = CancellationToken::new();
        for _ in 0..5 {
            limiter.acquire(&cancel).await.expect("should admit within burst");
        }
    }
}
