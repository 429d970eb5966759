use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::server::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": state.config.version,
        "corpus_size": state.corpus.all().len(),
        "llm_configured": state.llm_configured,
        "database_connected": state.database.is_some(),
    }))
}
