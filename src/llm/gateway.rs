//! C4 — LLM Gateway: `rate_limit(retry(breaker(transport)))` as four
//! composable layers, each independently testable, generalizing the
//! teacher's single-file retry+circuit module.

use super::call_log::{CallLog, CallLogRecord};
use super::circuit_breaker::{Admission, CircuitBreaker};
use super::provider::Provider;
use super::rate_limiter::RateLimiter;
use super::retry::{run_with_retry, RetryPolicy};
use super::types::{CompletionRequest, CompletionResponse};
use crate::error::AppError;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub struct LlmGateway {
    provider: Arc<dyn Provider>,
    breaker: CircuitBreaker,
    limiter: RateLimiter,
    retry_policy: RetryPolicy,
    call_log: CallLog,
}

impl LlmGateway {
    pub fn new(
        provider: Arc<dyn Provider>,
        breaker: CircuitBreaker,
        limiter: RateLimiter,
        retry_policy: RetryPolicy,
        call_log: CallLog,
    ) -> Self {
        Self {
            provider,
            breaker,
            limiter,
            retry_policy,
            call_log,
        }
    }

    /// Lets callers (the filter pipeline) short-circuit around the gateway
    /// entirely when the breaker is tripped, instead of paying for a
    /// rejected admission per candidate.
    pub fn circuit_open(&self) -> bool {
        self.breaker.state() == super::circuit_breaker::CircuitState::Open
    }

    pub async fn complete(
        &self,
        request: CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<CompletionResponse, AppError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        self.limiter.acquire(cancel).await?;

        if cancel.is_cancelled() {
            return Err(AppError::InternalError("request cancelled".to_string()));
        }

        let admission = self.breaker.admit();
        let retry_after = match admission {
            Admission::Allowed => None,
            Admission::Rejected { retry_after } => Some(retry_after),
        };
        if let Some(retry_after) = retry_after {
            return Err(AppError::CircuitOpen {
                retry_after_secs: retry_after.as_secs(),
            });
        }

        let provider = self.provider.clone();
        let result = run_with_retry(&self.retry_policy, || {
            let provider = provider.clone();
            let request = request.clone();
            async move { provider.complete(&request).await }
        })
        .await;

        if cancel.is_cancelled() {
            self.breaker.release_without_counting();
            return Err(AppError::InternalError("request cancelled".to_string()));
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        let record = match &result {
            Ok(response) => {
                self.breaker.record_success();
                CallLogRecord {
                    request_id,
                    model: request.model.clone(),
                    duration_ms,
                    prompt_tokens: response.usage.prompt_tokens,
                    completion_tokens: response.usage.completion_tokens,
                    success: true,
                    error_kind: None,
                }
            }
            Err(err) => {
                self.breaker.record_failure();
                CallLogRecord {
                    request_id,
                    model: request.model.clone(),
                    duration_ms,
                    prompt_tokens: 0,
                    completion_tokens: 0,
                    success: false,
                    error_kind: Some(err.error_type().to_string()),
                }
            }
        };
        if let Err(e) = self.call_log.write(&record).await {
            tracing::warn!(error = %e, "failed to persist LLM call log record");
        }

        result
    }
}
