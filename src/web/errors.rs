//! # Web API Error Types
//!
//! HTTP-facing errors and their response conversions. Every error body has
//! the shape `{"error": {"code": "...", "message": "..."}}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::assessment::{AssessError, ValidationError};
use crate::cache::CacheError;

/// Web API specific errors with HTTP status code mappings
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationError { reason: String },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Invalid assessment request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Missing resource: {message}")]
    MissingResource { message: String },

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Upstream assessment failed: {message}")]
    Upstream { message: String },

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn auth_error(reason: impl Into<String>) -> Self {
        Self::AuthenticationError {
            reason: reason.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationError { .. } => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest { .. }
            | ApiError::Validation(_)
            | ApiError::MissingResource { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::AuthenticationError { .. } => "AUTHENTICATION_FAILED",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::MissingResource { .. } => "MISSING_RESOURCE",
            ApiError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ApiError::Upstream { .. } => "UPSTREAM_ERROR",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let message = match &self {
            ApiError::AuthenticationError { reason } => reason.clone(),
            ApiError::BadRequest { message }
            | ApiError::MissingResource { message }
            | ApiError::Upstream { message } => message.clone(),
            other => other.to_string(),
        };

        let error_response = json!({
            "error": {
                "code": self.error_code(),
                "message": message
            }
        });

        (status_code, Json(error_response)).into_response()
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        if !err.is_client_error() {
            error!(error = %err, "Cache key derivation failed");
            return ApiError::Internal;
        }

        match err {
            CacheError::MissingResource {
                index,
                path,
                reason,
            } => {
                debug!(index, path = %path.display(), reason = %reason, "Image file unreadable");
                ApiError::MissingResource {
                    message: format!("Image {index} could not be read"),
                }
            }
            other => ApiError::bad_request(other.to_string()),
        }
    }
}

impl From<AssessError> for ApiError {
    fn from(err: AssessError) -> Self {
        let message = match &err {
            AssessError::Transport(_) => "Assessment service unreachable".to_string(),
            AssessError::UpstreamStatus { status, .. } => {
                format!("Assessment service returned status {status}")
            }
            AssessError::InvalidResponse(_) => {
                "Assessment service returned an invalid response".to_string()
            }
        };
        error!(error = %err, "Upstream assessment failed");
        ApiError::Upstream { message }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::bad_request("nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(body["error"]["message"], "nope");
    }

    #[tokio::test]
    async fn test_missing_resource_maps_to_400() {
        let err: ApiError = CacheError::missing_resource(
            1,
            PathBuf::from("/srv/uploads/gone.png"),
            "Permission denied (os error 13)",
        )
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "MISSING_RESOURCE");
        let message = body["error"]["message"].as_str().unwrap();
        assert_eq!(message, "Image 1 could not be read");
        assert!(!message.contains("/srv/uploads"));
        assert!(!message.contains("Permission denied"));
    }

    #[test]
    fn test_upstream_errors_map_to_502() {
        let err: ApiError = AssessError::UpstreamStatus {
            status: 500,
            body: "internal details".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(!err.to_string().contains("internal details"));

        let err: ApiError = AssessError::Transport("refused".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_other_cache_errors_are_internal() {
        let err: ApiError = CacheError::InvalidSecret("empty".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err: ApiError = ValidationError::EmptyImagePath { index: 0 }.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
