use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

use crate::corpus::StartupFilter;
use crate::error::{AppError, AppResult};
use crate::filter::composite_score;
use crate::models::Startup;
use crate::prioritization;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct AllQuery {
    #[serde(default)]
    skip: usize,
    limit: Option<usize>,
    industry: Option<String>,
    country: Option<String>,
    stage: Option<String>,
    min_funding: Option<f64>,
    name_substring: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AllResponse {
    total: usize,
    count: usize,
    startups: Vec<Startup>,
}

/// `list_startups(filter, page)` (§4.1) over `{industry, country, stage,
/// min_funding, name_substring}`, all optional and AND-combined.
pub async fn all(State(state): State<AppState>, Query(q): Query<AllQuery>) -> Json<AllResponse> {
    let limit = q.limit.unwrap_or(50).min(200);
    let filter = StartupFilter {
        industry: q.industry,
        country: q.country,
        stage: q.stage.as_deref().map(crate::models::Stage::normalize),
        min_funding: q.min_funding,
        name_substring: q.name_substring,
    };
    let (total, page) = state.corpus.list_startups(&filter, q.skip, limit);
    Json(AllResponse {
        total,
        count: page.len(),
        startups: page,
    })
}

#[derive(Debug, Deserialize)]
pub struct PrioritizedQuery {
    user_id: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default = "default_min_score")]
    min_score: i32,
}

fn default_limit() -> usize {
    50
}
fn default_min_score() -> i32 {
    30
}

#[derive(Debug, Serialize)]
pub struct PrioritizedResponse {
    total: usize,
    prioritized_count: usize,
    personalized: bool,
    user_id: Option<String>,
    startups: Vec<Startup>,
}

pub async fn prioritized(
    State(state): State<AppState>,
    Query(q): Query<PrioritizedQuery>,
) -> AppResult<Json<PrioritizedResponse>> {
    let startups = state.corpus.all();
    let total = startups.len();

    let votes = if let (Some(uid), Some(repos)) = (q.user_id.as_deref(), state.repos.as_ref()) {
        repos.votes.votes_of(uid).await?
    } else {
        Vec::new()
    };
    let personalized = votes.iter().any(|v| v.interested);
    let seen: HashSet<i64> = votes.iter().map(|v| v.startup_id).collect();

    let cancel = CancellationToken::new();
    let ranked = prioritization::prioritize(
        &state.classifier,
        &startups,
        q.user_id.as_deref(),
        q.limit,
        q.min_score,
        &votes,
        &seen,
        &cancel,
    );

    let outcome = crate::filter::filter(
        ranked,
        &state.classifier,
        &state.llm_gateway,
        &state.assessment_cache,
        crate::filter::DEFAULT_WORKER_COUNT,
        &cancel,
    )
    .await;
    let startups: Vec<Startup> = outcome.accepted.into_iter().map(|a| a.startup).collect();

    Ok(Json(PrioritizedResponse {
        total,
        prioritized_count: startups.len(),
        personalized,
        user_id: q.user_id,
        startups,
    }))
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    startup_id: i64,
    categories: Vec<String>,
    tiers: Vec<u8>,
    base_score: i32,
    composite_score: f64,
}

pub async fn insights(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<InsightsResponse>> {
    let startup = state
        .corpus
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("startup {} not found", id)))?;
    let categories = state.classifier.classify(&startup);
    let tiers = categories.iter().map(|c| c.tier()).collect();
    let base_score = state.classifier.base_score(&startup);
    let score = composite_score(&startup, &categories);
    Ok(Json(InsightsResponse {
        startup_id: id,
        categories: categories.iter().map(|c| format!("{:?}", c)).collect(),
        tiers,
        base_score,
        composite_score: score,
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchInsightsRequest {
    startup_ids: Vec<serde_json::Value>,
}

fn parse_startup_id(value: &serde_json::Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

pub async fn batch_insights(
    State(state): State<AppState>,
    Json(req): Json<BatchInsightsRequest>,
) -> Json<Vec<InsightsResponse>> {
    let mut out = Vec::with_capacity(req.startup_ids.len());
    for raw_id in &req.startup_ids {
        let Some(id) = parse_startup_id(raw_id) else { continue };
        let Some(startup) = state.corpus.get(id) else { continue };
        let categories = state.classifier.classify(&startup);
        let tiers = categories.iter().map(|c| c.tier()).collect();
        let base_score = state.classifier.base_score(&startup);
        let score = composite_score(&startup, &categories);
        out.push(InsightsResponse {
            startup_id: id,
            categories: categories.iter().map(|c| format!("{:?}", c)).collect(),
            tiers,
            base_score,
            composite_score: score,
        });
    }
    Json(out)
}

#[derive(Debug, Deserialize)]
pub struct EnrichedSearchQuery {
    query: String,
    enrichment_type: Option<String>,
    limit: Option<usize>,
}

pub async fn enriched_search(
    State(state): State<AppState>,
    Query(q): Query<EnrichedSearchQuery>,
) -> Json<AllResponse> {
    let limit = q.limit.unwrap_or(10).min(200);
    let matches: Vec<Startup> = state
        .corpus
        .search_by_name(&q.query)
        .into_iter()
        .filter(|s| s.enrichment.is_some())
        .filter(|s| match &q.enrichment_type {
            Some(t) => s
                .enrichment
                .as_ref()
                .and_then(|v| v.get("type"))
                .and_then(|v| v.as_str())
                .map(|v| v.eq_ignore_ascii_case(t))
                .unwrap_or(false),
            None => true,
        })
        .take(limit)
        .collect();
    Json(AllResponse {
        total: matches.len(),
        count: matches.len(),
        startups: matches,
    })
}

pub async fn enrichment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let startup = state
        .corpus
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("startup {} not found", id)))?;
    Ok(Json(startup.enrichment.unwrap_or(serde_json::json!({}))))
}

#[derive(Debug, Serialize)]
pub struct EnrichmentStatsResponse {
    total: usize,
    enriched: usize,
    unenriched: usize,
}

pub async fn enrichment_stats(State(state): State<AppState>) -> Json<EnrichmentStatsResponse> {
    let startups = state.corpus.all();
    let total = startups.len();
    let enriched = startups.iter().filter(|s| s.enrichment.is_some()).count();
    Json(EnrichmentStatsResponse {
        total,
        enriched,
        unenriched: total - enriched,
    })
}
