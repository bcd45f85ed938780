use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and cache size.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let cache = state.recommendations.cache();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "recommendation-api",
        "cached_entries": cache.len().await,
        "cache_ttl_secs": cache.ttl().as_secs()
    }))
}
