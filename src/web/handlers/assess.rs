//! # Assessment Handler
//!
//! `POST /api/v1/assess`: validate the submission and hand it to the
//! configured [`Assessor`](crate::assessment::Assessor). Caching happens in
//! the surrounding middleware; this handler always does the real work.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use tracing::{debug, info, warn};

use crate::assessment::{AssessmentRequest, AssessmentResponse};
use crate::web::errors::ApiError;
use crate::web::middleware::request_id::RequestId;
use crate::web::state::AppState;

pub async fn assess(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Json<AssessmentResponse>, ApiError> {
    let request_id = request_id.map(|Extension(id)| id);
    let request_id = request_id.as_ref().map_or("-", RequestId::as_str);

    let Json(request) = payload.map_err(|rejection| {
        warn!(request_id, error = %rejection.body_text(), "Rejected malformed assessment body");
        ApiError::from(rejection)
    })?;
    request.validate().map_err(|e| {
        warn!(request_id, error = %e, "Rejected invalid assessment request");
        ApiError::from(e)
    })?;

    debug!(
        request_id,
        task_kind = %request.task_kind,
        images = request.images.len(),
        assessor = state.assessor.name(),
        "Forwarding assessment request"
    );

    let started = std::time::Instant::now();
    let response = state.assessor.assess(&request).await.map_err(|e| {
        warn!(request_id, error = %e, "Assessment failed");
        ApiError::from(e)
    })?;

    info!(
        request_id,
        task_kind = %request.task_kind,
        duration_ms = started.elapsed().as_millis() as u64,
        "Assessment completed"
    );

    Ok(Json(response))
}
