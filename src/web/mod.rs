//! # Web API Module
//!
//! Axum-based HTTP surface of the assessor service.
//!
//! ## Core Components
//!
//! - [`routes`] - route definitions
//! - [`handlers`] - request handlers per endpoint group
//! - [`middleware`] - request IDs, API-key auth, response caching
//! - [`state`] - shared application state, including the response cache
//! - [`errors`] - HTTP error type and JSON error bodies
//!
//! ## Middleware Order
//!
//! Outermost first: trace, CORS, timeout, body limit, request ID, API key,
//! response cache. Authentication runs before the cache, so rejected
//! requests never touch cached entries.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use state::AppState;

/// Create the main Axum application with all routes and middleware
pub fn create_app(app_state: AppState) -> Router {
    let request_timeout = app_state.config.web.request_timeout();
    let max_body_bytes = app_state.config.web.max_body_bytes;

    let cached_routes = routes::assess_routes().layer(axum::middleware::from_fn_with_state(
        app_state.clone(),
        middleware::response_cache::cache_responses,
    ));

    let protected_routes = Router::new()
        .merge(cached_routes)
        .merge(routes::cache_routes())
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::require_api_key,
        ));

    Router::new()
        .merge(routes::health_routes())
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(
            middleware::request_id::add_request_id,
        ))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(tower_http::timeout::TimeoutLayer::new(request_timeout))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}
