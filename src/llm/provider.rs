use super::types::{CompletionRequest, CompletionResponse};
use crate::error::AppResult;
use async_trait::async_trait;

/// Transport to the external LLM vendor. Kept deliberately thin so the
/// retry/rate-limit/circuit-breaker layers above it are independently
/// testable against a fake implementation.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> AppResult<CompletionResponse>;
}

pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpProvider {
    pub fn new(base_url: String, api_key: Option<String>, timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn complete(&self, request: &CompletionRequest) -> AppResult<CompletionResponse> {
        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::error::AppError::LlmRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }
        let completion: CompletionResponse = response.json().await?;
        Ok(completion)
    }
}
