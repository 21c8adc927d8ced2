use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and which provider keys are configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobmatch-api",
        "model": state.config.groq_model,
        "search_configured": state.config.serpapi_key.is_some(),
        "llm_configured": state.config.groq_api_key.is_some(),
    }))
}
