//! # Authentication Middleware
//!
//! API-key authentication for protected endpoints. A key is accepted from
//! `x-api-key` or from `Authorization: Bearer <key>`. When no keys are
//! configured, authentication is disabled.
//!
//! This layer sits outside the response cache, so a rejected request never
//! reads from or writes to the cache.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::web::errors::ApiError;
use crate::web::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config.web.auth_enabled() {
        return Ok(next.run(request).await);
    }

    let presented = extract_api_key(request.headers())?;

    let accepted = state
        .config
        .web
        .api_keys
        .iter()
        .any(|key| constant_time_eq(key.as_bytes(), presented.as_bytes()));

    if !accepted {
        warn!(path = %request.uri().path(), "Rejected request with unknown API key");
        return Err(ApiError::auth_error("Invalid API key"));
    }

    debug!(path = %request.uri().path(), "Authenticated request");
    Ok(next.run(request).await)
}

/// Pull the presented key from `x-api-key`, falling back to a Bearer token
fn extract_api_key(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(value) = headers.get(API_KEY_HEADER) {
        let key = value
            .to_str()
            .map_err(|_| ApiError::auth_error("Invalid x-api-key header format"))?;
        if key.is_empty() {
            return Err(ApiError::auth_error("Empty API key"));
        }
        return Ok(key.to_string());
    }

    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::auth_error("Missing API key"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::auth_error("Invalid authorization header format"))?;

    extract_bearer_token(auth_str).map(str::to_string)
}

fn extract_bearer_token(auth_header: &str) -> Result<&str, ApiError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::auth_error("Authorization header must use Bearer scheme"))?;

    if token.is_empty() {
        return Err(ApiError::auth_error("Empty Bearer token"));
    }

    Ok(token)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
