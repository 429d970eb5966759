use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::orchestrator::{self, linkedin::LinkedinPostRequest, UserContext};
use crate::server::AppState;
use crate::tools;

fn require_llm(state: &AppState) -> AppResult<()> {
    if state.llm_configured {
        Ok(())
    } else {
        Err(AppError::ServiceBusy(
            "LLM_API_KEY is not configured".to_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct UserContextPayload {
    pub user_id: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub user_context: Option<UserContextPayload>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub question_type: String,
}

pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> AppResult<Json<AskResponse>> {
    require_llm(&state)?;
    let cancel = CancellationToken::new();
    let user_context = req.user_context.map(|u| UserContext {
        user_id: u.user_id,
        role: u.role,
        interests: u.interests,
        location: u.location,
        intent_hint: None,
    });
    let response = orchestrator::answer(
        &state.llm_gateway,
        &state.corpus,
        &req.question,
        user_context.as_ref(),
        &cancel,
    )
    .await?;
    Ok(Json(AskResponse {
        answer: response.answer,
        question_type: response.question_type,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LinkedinPostPayload {
    pub topic: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub people_companies_to_tag: Vec<String>,
    pub call_to_action: Option<String>,
    pub link: Option<String>,
}

pub async fn generate_linkedin_post(
    State(state): State<AppState>,
    Json(payload): Json<LinkedinPostPayload>,
) -> AppResult<Json<AskResponse>> {
    require_llm(&state)?;
    let cancel = CancellationToken::new();
    let req = LinkedinPostRequest {
        topic: payload.topic,
        key_points: payload.key_points,
        people_companies_to_tag: payload.people_companies_to_tag,
        call_to_action: payload.call_to_action,
        link: payload.link,
    };
    let answer = orchestrator::linkedin::generate_post(&state.llm_gateway, &req, &cancel).await?;
    Ok(Json(AskResponse {
        answer,
        question_type: "linkedin_post".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DirectionsRequest {
    #[allow(dead_code)]
    pub question: String,
}

/// Directions are an external collaborator (the conference's mapping
/// integration, §1 Out of scope) — this route always returns the same
/// redirect rather than attempting to answer itself.
pub async fn directions(Json(_req): Json<DirectionsRequest>) -> Json<AskResponse> {
    Json(AskResponse {
        answer: "Directions are handled by the conference's mapping integration; \
                 ask the front desk app for turn-by-turn directions."
            .to_string(),
        question_type: "directions".to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct StartupDetailsRequest {
    pub startup_id: Option<i64>,
    pub company_name: Option<String>,
}

pub async fn startup_details(
    State(state): State<AppState>,
    Json(req): Json<StartupDetailsRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let mut args = serde_json::Map::new();
    if let Some(id) = req.startup_id {
        args.insert("startup_id".to_string(), serde_json::json!(id));
    }
    if let Some(name) = req.company_name {
        args.insert("company_name".to_string(), serde_json::json!(name));
    }
    let result = tools::execute_tool(
        &state.corpus,
        "get_startup_details",
        serde_json::Value::Object(args),
    )
    .await;
    if result["success"] == serde_json::json!(false) {
        return Err(AppError::NotFound(
            result["error"].as_str().unwrap_or("startup not found").to_string(),
        ));
    }
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct EventDetailsRequest {
    pub event_id: Uuid,
}

pub async fn event_details(
    State(state): State<AppState>,
    Json(req): Json<EventDetailsRequest>,
) -> AppResult<Json<crate::models::CalendarEvent>> {
    let repos = state
        .repos
        .as_ref()
        .ok_or_else(|| AppError::ServiceBusy("persistent storage is not configured".to_string()))?;
    let event = repos
        .events
        .get(req.event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("event {} not found", req.event_id)))?;
    Ok(Json(event))
}
