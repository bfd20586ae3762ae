//! # Cache Administration Handlers
//!
//! Operator endpoints for inspecting and clearing the response cache.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::cache::CacheStats;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub cleared_entries: usize,
    pub cleared_bytes: usize,
}

/// Cache statistics: GET /api/v1/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.response_cache.stats())
}

/// Drop every cached response: DELETE /api/v1/cache
pub async fn clear_cache(State(state): State<AppState>) -> Json<CacheClearResponse> {
    let before = state.response_cache.stats();
    state.response_cache.clear();

    info!(
        cleared_entries = before.entries,
        cleared_bytes = before.size_bytes,
        "Response cache cleared by operator"
    );

    Json(CacheClearResponse {
        cleared_entries: before.entries,
        cleared_bytes: before.size_bytes,
    })
}
