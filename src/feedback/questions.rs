//! Initial-transition question generation: three questions, one per fixed
//! category in order Technical → Business → Action, drawn from the LLM
//! and validated positionally rather than trusting its self-reported
//! category label.

use crate::error::AppError;
use crate::llm::{CompletionParams, CompletionRequest, LlmGateway, Message};
use crate::models::{Question, QuestionCategory};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const SYSTEM_PROMPT: &str = "You write short, specific feedback questions for attendees who just \
met a startup at a networking conference. Always return exactly 3 questions as a JSON array, one \
per category in this exact order: technical, business, action.";

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    #[allow(dead_code)]
    category: String,
    text: String,
    #[serde(default)]
    placeholder: String,
}

const CATEGORY_ORDER: [QuestionCategory; 3] = [
    QuestionCategory::Technical,
    QuestionCategory::Business,
    QuestionCategory::Action,
];

fn parse_questions(raw: &str) -> Result<Vec<Question>, AppError> {
    let parsed: Vec<RawQuestion> = serde_json::from_str(raw)
        .map_err(|e| AppError::LlmRequestFailed(format!("malformed question payload: {e}")))?;
    if parsed.len() != 3 {
        return Err(AppError::LlmRequestFailed(format!(
            "expected exactly 3 questions, got {}",
            parsed.len()
        )));
    }
    Ok(parsed
        .into_iter()
        .zip(CATEGORY_ORDER)
        .map(|(raw_q, category)| Question {
            id: Uuid::new_v4(),
            text: raw_q.text,
            category,
            placeholder: raw_q.placeholder,
        })
        .collect())
}

pub async fn generate_questions(
    gateway: &LlmGateway,
    startup_name: &str,
    startup_description: &str,
    cancel: &CancellationToken,
) -> Result<Vec<Question>, AppError> {
    let prompt = format!(
        "Startup: {startup_name}\nDescription: {startup_description}\n\n\
         Reply with only a JSON array of 3 objects: \
         [{{\"category\":\"technical\",\"text\":\"...\",\"placeholder\":\"...\"}}, \
         {{\"category\":\"business\",...}}, {{\"category\":\"action\",...}}]"
    );
    let messages = vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)];
    let request = CompletionRequest {
        messages,
        model: "gpt-4o-mini".to_string(),
        params: CompletionParams {
            temperature: 0.5,
            max_tokens: 400,
        },
        tools: None,
        metadata: None,
    };
    let response = gateway.complete(request, cancel).await?;
    parse_questions(&response.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_questions_in_fixed_category_order() {
        let raw = r#"[
            {"category":"technical","text":"How does the platform scale?","placeholder":"e.g. microservices"},
            {"category":"business","text":"What is the pricing model?","placeholder":"e.g. per seat"},
            {"category":"action","text":"Who should we introduce you to?","placeholder":"e.g. a VP"}
        ]"#;
        let questions = parse_questions(raw).expect("should parse");
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].category, QuestionCategory::Technical);
        assert_eq!(questions[1].category, QuestionCategory::Business);
        assert_eq!(questions[2].category, QuestionCategory::Action);
    }

    #[test]
    fn rejects_payloads_with_wrong_question_count() {
        let raw = r#"[{"category":"technical","text":"only one","placeholder":""}]"#;
        assert!(parse_questions(raw).is_err());
    }
}
