//! C8 — Conversation Orchestrator: classifies intent, then dispatches to
//! the LinkedIn sub-flow, the feedback sub-flow, an external directions
//! collaborator, or the bounded tool-call loop.

pub mod intent;
pub mod linkedin;
pub mod tool_loop;

pub use intent::Intent;
pub use linkedin::LinkedinPostRequest;

use crate::corpus::CorpusStore;
use crate::error::AppError;
use crate::llm::LlmGateway;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub interests: Vec<String>,
    pub location: Option<String>,
    pub intent_hint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub answer: String,
    pub question_type: String,
}

/// `answer(question, user_context?) -> Response`, the contract every
/// `/concierge/*` route collapses down to.
pub async fn answer(
    gateway: &LlmGateway,
    corpus: &CorpusStore,
    question: &str,
    user_context: Option<&UserContext>,
    cancel: &CancellationToken,
) -> Result<Response, AppError> {
    let hint = user_context.and_then(|c| c.intent_hint.as_deref());
    let intent = intent::classify(question, hint);

    let text = match intent {
        Intent::LinkedinPost => {
            let req = LinkedinPostRequest {
                topic: question.to_string(),
                key_points: user_context
                    .map(|c| c.interests.clone())
                    .unwrap_or_default(),
                people_companies_to_tag: Vec::new(),
                call_to_action: None,
                link: None,
            };
            linkedin::generate_post(gateway, &req, cancel).await?
        }
        Intent::FeedbackFlow => {
            "Start a feedback session via POST /feedback/start to walk through this.".to_string()
        }
        Intent::Directions => {
            "Directions are handled by the conference's mapping integration; \
             ask the front desk app for turn-by-turn directions."
                .to_string()
        }
        Intent::StartupInfo | Intent::EventInfo | Intent::General => {
            tool_loop::run(gateway, corpus, question, cancel).await?
        }
    };

    Ok(Response {
        answer: text,
        question_type: intent.as_str().to_string(),
    })
}
