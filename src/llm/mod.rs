pub mod call_log;
pub mod circuit_breaker;
pub mod gateway;
pub mod provider;
pub mod rate_limiter;
pub mod retry;
pub mod types;

pub use gateway::LlmGateway;
pub use types::{CompletionParams, CompletionRequest, CompletionResponse, Message};
