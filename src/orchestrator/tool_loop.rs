//! Bounded tool-call loop for the `startup_info`/`event_info`/`general`
//! intents: alternates LLM completions with sequential tool execution
//! against C1, up to 5 iterations, with a single self-correction retry on
//! a schema-validation failure.

use crate::corpus::CorpusStore;
use crate::error::AppError;
use crate::llm::{CompletionParams, CompletionRequest, LlmGateway, Message};
use crate::tools;
use tokio_util::sync::CancellationToken;

const MAX_ITERATIONS: u32 = 5;
const SYSTEM_PROMPT: &str = "You are a concierge for a startup-discovery conference app. \
Use the provided tools to look up startups before answering. Keep answers concise.";

/// `RateLimitExceeded`/`CircuitOpen` are classified at the gateway boundary
/// and never reach the orchestrator as raw transport errors — the
/// orchestrator only ever sees `ServiceBusy` for those.
fn classify_gateway_error(err: AppError) -> AppError {
    match err {
        AppError::RateLimitExceeded { .. } | AppError::CircuitOpen { .. } => {
            AppError::ServiceBusy("the assistant is temporarily unavailable".to_string())
        }
        other => other,
    }
}

pub async fn run(
    gateway: &LlmGateway,
    corpus: &CorpusStore,
    question: &str,
    cancel: &CancellationToken,
) -> Result<String, AppError> {
    let mut messages = vec![Message::system(SYSTEM_PROMPT), Message::user(question)];
    let tool_specs = tools::as_completion_tools();
    let mut correction_used = false;
    let mut last_content = String::new();

    for _ in 0..MAX_ITERATIONS {
        let request = CompletionRequest {
            messages: messages.clone(),
            model: "gpt-4o-mini".to_string(),
            params: CompletionParams {
                temperature: 0.3,
                max_tokens: 800,
            },
            tools: Some(tool_specs.clone()),
            metadata: None,
        };

        let response = gateway
            .complete(request, cancel)
            .await
            .map_err(classify_gateway_error)?;
        last_content = response.content.clone();

        let calls = match &response.tool_calls {
            Some(calls) if !calls.is_empty() => calls.clone(),
            _ => return Ok(response.content),
        };

        messages.push(Message::assistant(&response.content));

        for call in calls {
            let Some(spec) = tools::find_tool(&call.name) else {
                messages.push(Message::tool(
                    serde_json::json!({"success": false, "error": "unknown tool"}).to_string(),
                    call.id.clone(),
                ));
                continue;
            };

            match tools::validate_and_parse(&spec, &call.arguments) {
                Ok(()) => {
                    let result = tools::execute_tool(corpus, &call.name, call.arguments.clone()).await;
                    messages.push(Message::tool(result.to_string(), call.id.clone()));
                }
                Err(e) if !correction_used => {
                    correction_used = true;
                    messages.push(Message::tool(
                        serde_json::json!({"success": false, "error": e.to_string()}).to_string(),
                        call.id.clone(),
                    ));
                    messages.push(Message::system(
                        "Your previous tool call had invalid arguments. Re-check the schema and try again.",
                    ));
                }
                Err(e) => {
                    return Err(AppError::InternalError(format!(
                        "tool argument validation failed after correction attempt: {}",
                        e
                    )));
                }
            }
        }
    }

    if last_content.trim().is_empty() {
        Ok("I wasn't able to gather enough information to answer confidently.".to_string())
    } else {
        Ok(last_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_transport_errors_into_service_busy() {
        let err = classify_gateway_error(AppError::RateLimitExceeded { retry_after_secs: 5 });
        assert!(matches!(err, AppError::ServiceBusy(_)));
        let err = classify_gateway_error(AppError::CircuitOpen { retry_after_secs: 5 });
        assert!(matches!(err, AppError::ServiceBusy(_)));
        let err = classify_gateway_error(AppError::BadRequest("x".to_string()));
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
