//! # Health Check Handlers
//!
//! Liveness endpoints for monitoring and load balancing. Both are public.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::cache::CacheStats;
use crate::logging::get_environment;
use crate::web::state::AppState;

/// Basic health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
}

/// Detailed health check response
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    status: String,
    timestamp: String,
    info: HealthInfo,
    cache: CacheStats,
}

/// Service information for detailed health
#[derive(Debug, Serialize)]
pub struct HealthInfo {
    version: String,
    environment: String,
    assessor: String,
    auth_enabled: bool,
}

/// Basic health check endpoint: GET /health
///
/// Returns OK whenever the process is serving requests.
pub async fn basic_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Detailed health endpoint: GET /health/detailed
pub async fn detailed_health(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    Json(DetailedHealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        info: HealthInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: get_environment(),
            assessor: state.assessor.name().to_string(),
            auth_enabled: state.config.web.auth_enabled(),
        },
        cache: state.response_cache.stats(),
    })
}
