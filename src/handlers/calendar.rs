//! Ambient CRUD for calendar events, votes, and ratings — straightforward
//! JSON schemas over the repository layer, out of the CORE subsystems.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CalendarEvent, Rating, Vote};
use crate::server::AppState;

fn require_storage(state: &AppState) -> AppResult<&crate::server::Repositories> {
    state
        .repos
        .as_ref()
        .ok_or_else(|| AppError::ServiceBusy("persistent storage is not configured".to_string()))
}

pub async fn list_events(State(state): State<AppState>) -> AppResult<Json<Vec<CalendarEvent>>> {
    let repos = require_storage(&state)?;
    Ok(Json(repos.events.list().await?))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CalendarEvent>> {
    let repos = require_storage(&state)?;
    let event = repos
        .events
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("event {} not found", id)))?;
    Ok(Json(event))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(event): Json<CalendarEvent>,
) -> AppResult<Json<CalendarEvent>> {
    let repos = require_storage(&state)?;
    Ok(Json(repos.events.create(&event).await?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let repos = require_storage(&state)?;
    repos.events.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub user_id: String,
    pub startup_id: i64,
    pub interested: bool,
}

pub async fn cast_vote(
    State(state): State<AppState>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<Vote>> {
    let repos = require_storage(&state)?;
    let vote = repos
        .votes
        .upsert(&req.user_id, req.startup_id, req.interested)
        .await?;
    Ok(Json(vote))
}

pub async fn votes_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Vote>>> {
    let repos = require_storage(&state)?;
    Ok(Json(repos.votes.votes_of(&user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub user_id: String,
    pub startup_id: i64,
    pub score: i16,
}

pub async fn rate(
    State(state): State<AppState>,
    Json(req): Json<RatingRequest>,
) -> AppResult<Json<Rating>> {
    let repos = require_storage(&state)?;
    let rating = repos
        .ratings
        .upsert(&req.user_id, req.startup_id, req.score)
        .await?;
    Ok(Json(rating))
}

pub async fn ratings_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Rating>>> {
    let repos = require_storage(&state)?;
    Ok(Json(repos.ratings.ratings_of(&user_id).await?))
}
