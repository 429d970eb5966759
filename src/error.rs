use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("circuit open, retry after {retry_after_secs}s")]
    CircuitOpen { retry_after_secs: u64 },

    #[error("service busy: {0}")]
    ServiceBusy(String),

    #[error("upstream LLM request failed: {0}")]
    LlmRequestFailed(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("timeout: {0}")]
    TimeoutError(String),

    #[error("persistence error: {0}")]
    DatabaseError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::CircuitOpen { .. } | AppError::ServiceBusy(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::TimeoutError(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::LlmRequestFailed(_)
            | AppError::ConfigError(_)
            | AppError::NetworkError(_)
            | AppError::SerializationError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Conflict(_) => "conflict",
            AppError::RateLimitExceeded { .. } => "rate_limit_exceeded",
            AppError::CircuitOpen { .. } => "circuit_open",
            AppError::ServiceBusy(_) => "service_busy",
            AppError::LlmRequestFailed(_) => "llm_request_failed",
            AppError::ConfigError(_) => "config_error",
            AppError::NetworkError(_) => "network_error",
            AppError::SerializationError(_) => "serialization_error",
            AppError::TimeoutError(_) => "timeout_error",
            AppError::DatabaseError(_) => "database_error",
            AppError::InternalError(_) => "internal_error",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::NotFound(_) => "🔍 We couldn't find what you asked for.".to_string(),
            AppError::BadRequest(_) => "⚠️ That request wasn't quite right.".to_string(),
            AppError::Conflict(_) => "⚠️ This conflicts with existing state.".to_string(),
            AppError::RateLimitExceeded { retry_after_secs } => format!(
                "🚦 Too many requests. Please wait {}s before trying again.",
                retry_after_secs
            ),
            AppError::CircuitOpen { retry_after_secs } => format!(
                "🔌 The assessment service is recovering. Please try again in {}s.",
                retry_after_secs
            ),
            AppError::ServiceBusy(_) => {
                "⏳ The service is at capacity right now. Please try again shortly.".to_string()
            }
            AppError::LlmRequestFailed(details) => {
                let lower = details.to_lowercase();
                if lower.contains("api key") {
                    "🔑 Authentication issue with the AI service.".to_string()
                } else if lower.contains("timeout") {
                    "⏰ The AI service is taking too long to respond.".to_string()
                } else if lower.contains("rate limit") {
                    "🚦 Too many requests to the AI service.".to_string()
                } else {
                    "🌐 There was an issue communicating with the AI service.".to_string()
                }
            }
            AppError::TimeoutError(_) => "⏰ Request timed out.".to_string(),
            _ => format!("❌ {}", self),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4();
        let status_code = self.status_code();
        let mut retry_after = None;
        if let AppError::RateLimitExceeded { retry_after_secs }
        | AppError::CircuitOpen { retry_after_secs } = &self
        {
            retry_after = Some(*retry_after_secs);
        }

        let error_response = json!({
            "error": self.error_type(),
            "message": self.user_friendly_message(),
            "details": self.to_string(),
            "request_id": request_id,
            "timestamp": Utc::now().to_rfc3339(),
            "status_code": status_code.as_u16(),
            "retry_after_secs": retry_after,
        });

        tracing::error!(
            error = %self,
            status_code = %status_code,
            error_type = self.error_type(),
            request_id = %request_id,
            "request failed"
        );

        (status_code, Json(error_response)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::TimeoutError(err.to_string())
        } else if err.is_connect() {
            AppError::NetworkError(err.to_string())
        } else {
            AppError::LlmRequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::TimeoutError(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".to_string()),
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
