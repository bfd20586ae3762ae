//! # Request ID Middleware
//!
//! Tags each request with an ID for log correlation. A well-formed incoming
//! `x-request-id` is kept; otherwise a UUID v4 is generated.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Attach a request ID to extensions, the tracing span, and the response
pub async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| is_acceptable_id(value))
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn is_acceptable_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Request ID wrapper for extension storage
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_as_str() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id = RequestId(uuid_str.to_string());
        assert_eq!(id.as_str(), uuid_str);
    }

    #[test]
    fn test_acceptable_ids() {
        assert!(is_acceptable_id("550e8400-e29b-41d4-a716-446655440000"));
        assert!(is_acceptable_id("trace_42"));

        assert!(!is_acceptable_id(""));
        assert!(!is_acceptable_id("has spaces"));
        assert!(!is_acceptable_id("newline\n"));
        assert!(!is_acceptable_id(&"a".repeat(MAX_REQUEST_ID_LEN + 1)));
    }
}
