use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::feedback;
use crate::models::{FeedbackSession, Insight, StructuredQaEntry};
use crate::server::AppState;

fn require_storage(state: &AppState) -> AppResult<&crate::server::Repositories> {
    state
        .repos
        .as_ref()
        .ok_or_else(|| AppError::ServiceBusy("persistent storage is not configured".to_string()))
}

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
pub struct StartFeedbackRequest {
    pub meeting_id: String,
    pub user_id: String,
    pub startup_id: Option<i64>,
    pub startup_name: String,
    pub startup_description: String,
}

pub async fn start(
    State(state): State<AppState>,
    Json(req): Json<StartFeedbackRequest>,
) -> AppResult<Json<FeedbackSession>> {
    require_llm(&state)?;
    let repos = require_storage(&state)?;
    let cancel = CancellationToken::new();

    let questions = feedback::generate_questions(
        &state.llm_gateway,
        &req.startup_name,
        &req.startup_description,
        &cancel,
    )
    .await?;

    let session = feedback::start(
        req.meeting_id,
        req.user_id,
        req.startup_id,
        req.startup_name,
        questions,
    );
    let saved = repos.feedback_sessions.create(&session).await?;
    Ok(Json(saved))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackChatRequest {
    pub session_id: Uuid,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackChatResponse {
    pub session: FeedbackSession,
    pub insight: Option<Insight>,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<FeedbackChatRequest>,
) -> AppResult<Json<FeedbackChatResponse>> {
    let repos = require_storage(&state)?;
    let mut session = repos
        .feedback_sessions
        .get(req.session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("feedback session {} not found", req.session_id)))?;

    feedback::reply(&mut session, &req.text)?;
    repos.feedback_sessions.save(&session).await?;

    let insight = if session.status == crate::models::FeedbackSessionStatus::Completed {
        let insight = feedback::to_insight(&session);
        repos.feedback_sessions.save_insight(&insight).await?;
        Some(insight)
    } else {
        None
    };

    Ok(Json(FeedbackChatResponse { session, insight }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FeedbackSession>> {
    let repos = require_storage(&state)?;
    let mut session = repos
        .feedback_sessions
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("feedback session {} not found", id)))?;
    if feedback::apply_timeout(&mut session) {
        repos.feedback_sessions.save(&session).await?;
    }
    Ok(Json(session))
}

pub async fn preview(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> AppResult<Json<Insight>> {
    let repos = require_storage(&state)?;
    let insight = repos
        .feedback_sessions
        .get_insight_by_meeting(&meeting_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no insight for meeting {}", meeting_id)))?;
    Ok(Json(insight))
}

#[derive(Debug, Deserialize)]
pub struct EditInsightRequest {
    pub structured_qa: Vec<StructuredQaEntry>,
}

pub async fn edit_insight(
    State(state): State<AppState>,
    Path(insight_id): Path<Uuid>,
    Json(req): Json<EditInsightRequest>,
) -> AppResult<Json<Insight>> {
    let repos = require_storage(&state)?;
    let mut insight = repos
        .feedback_sessions
        .get_insight(insight_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("insight {} not found", insight_id)))?;
    feedback::edit_insight(&mut insight, req.structured_qa);
    repos.feedback_sessions.save_insight(&insight).await?;
    Ok(Json(insight))
}
