//! # Web API Route Definitions
//!
//! Routes carry their full paths rather than being nested, so middleware
//! sees the same path the cache policy matches against.

use crate::cache::ASSESS_ROUTE;
use crate::web::handlers;
use crate::web::state::AppState;
use axum::routing::{delete, get, post};
use axum::Router;

/// Assessment API, fronted by the response cache
pub fn assess_routes() -> Router<AppState> {
    Router::new().route(ASSESS_ROUTE, post(handlers::assess::assess))
}

/// Cache administration API
pub fn cache_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/cache/stats", get(handlers::cache::cache_stats))
        .route("/api/v1/cache", delete(handlers::cache::clear_cache))
}

/// Health endpoints, never behind authentication
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/health/detailed", get(handlers::health::detailed_health))
}
