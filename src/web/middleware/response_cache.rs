//! # Response Cache Middleware
//!
//! Fronts the assessment handler with the shared [`ResponseStore`]:
//!
//! 1. Requests the policy does not cover pass straight through.
//! 2. The body is buffered and parsed; invalid requests pass through
//!    uncached so the handler can report the problem.
//! 3. The fingerprint is derived, on the blocking pool when image files
//!    must be read. An unreadable image answers `400 MISSING_RESOURCE`.
//! 4. A live entry is replayed with `x-cache: HIT`.
//! 5. Otherwise the handler runs and a 2xx response is stored before being
//!    returned with `x-cache: MISS`.
//!
//! [`ResponseStore`]: crate::web::state::ResponseStore

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::assessment::AssessmentRequest;
use crate::cache::store::key_prefix;
use crate::cache::SizedValue;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// A fully buffered response, replayable any number of times
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        if let Some(content_type) = self.content_type {
            response.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        response
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

fn with_cache_status(mut response: Response, status: CacheStatus) -> Response {
    response.headers_mut().insert(
        CACHE_STATUS_HEADER,
        HeaderValue::from_static(status.as_str()),
    );
    response
}

/// Fingerprint the request, moving file reads onto the blocking pool
async fn derive_cache_key(
    state: &AppState,
    method: Method,
    path: String,
    assessment: AssessmentRequest,
) -> Result<Option<String>, ApiError> {
    if !assessment.reads_image_files() {
        return Ok(state.cache_policy.derive_key(&method, &path, &assessment)?);
    }

    let policy = Arc::clone(&state.cache_policy);
    let derived = tokio::task::spawn_blocking(move || policy.derive_key(&method, &path, &assessment))
        .await
        .map_err(|e| {
            error!(error = %e, "Cache key derivation task failed");
            ApiError::Internal
        })?;

    Ok(derived?)
}

pub async fn cache_responses(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if !state.cache_policy.is_request_cacheable(&method, &path) {
        return Ok(next.run(request).await);
    }

    let limit = state.config.web.max_body_bytes;
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, limit).await.map_err(|e| {
        debug!(error = %e, limit, "Could not buffer assessment request body");
        ApiError::PayloadTooLarge { limit }
    })?;

    let assessment = match serde_json::from_slice::<AssessmentRequest>(&bytes) {
        Ok(assessment) if assessment.validate().is_ok() => assessment,
        _ => {
            debug!(path = %path, "Request is not a valid assessment, bypassing cache");
            let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;
            return Ok(with_cache_status(response, CacheStatus::Miss));
        }
    };

    let Some(key) = derive_cache_key(&state, method, path, assessment).await? else {
        return Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await);
    };

    if let Some(cached) = state.response_cache.get(&key) {
        debug!(key_prefix = key_prefix(&key), "Serving assessment from cache");
        return Ok(with_cache_status(
            cached.into_payload().into_response(),
            CacheStatus::Hit,
        ));
    }

    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

    if !state.cache_policy.is_response_cacheable(response.status()) {
        debug!(
            key_prefix = key_prefix(&key),
            status = response.status().as_u16(),
            "Response not cacheable"
        );
        return Ok(with_cache_status(response, CacheStatus::Miss));
    }

    let (response_parts, response_body) = response.into_parts();
    let body = axum::body::to_bytes(response_body, usize::MAX)
        .await
        .map_err(|e| {
            warn!(error = %e, "Could not buffer assessment response");
            ApiError::Internal
        })?;

    let cached = CachedResponse {
        status: response_parts.status,
        content_type: response_parts.headers.get(CONTENT_TYPE).cloned(),
        body: body.clone(),
    };
    state
        .response_cache
        .set(key, SizedValue::new(body.len(), cached), None);

    Ok(with_cache_status(
        Response::from_parts(response_parts, Body::from(body)),
        CacheStatus::Miss,
    ))
}
