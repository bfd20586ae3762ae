#![allow(dead_code)]

pub mod strategies;

use assessor_core::assessment::{AssessError, AssessmentRequest, AssessmentResponse, Assessor};
use assessor_core::config::{CacheConfig, UpstreamConfig, WebConfig, DEFAULT_UPSTREAM_URL};
use assessor_core::{create_app, AppState, AssessorConfig};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_API_KEY: &str = "test-api-key";

/// Assessor double that counts calls and can be switched into failure mode
#[derive(Debug, Default)]
pub struct CountingAssessor {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl CountingAssessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Assessor for CountingAssessor {
    async fn assess(&self, request: &AssessmentRequest) -> Result<AssessmentResponse, AssessError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.failing.load(Ordering::SeqCst) {
            return Err(AssessError::UpstreamStatus {
                status: 503,
                body: "provider overloaded".to_string(),
            });
        }

        Ok(json!({
            "score": 4,
            "feedback": "Consistent with the reference.",
            "taskKind": request.task_kind.as_str(),
            "call": call,
        }))
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

pub fn test_config(api_keys: &[&str]) -> AssessorConfig {
    AssessorConfig {
        cache: CacheConfig {
            ttl: Duration::from_secs(3600),
            max_size_bytes: 1024 * 1024,
            hash_secret: TEST_SECRET.to_string(),
        },
        web: WebConfig {
            bind_address: "127.0.0.1:0".to_string(),
            request_timeout_ms: 30_000,
            max_body_bytes: 8 * 1024 * 1024,
            api_keys: api_keys.iter().map(|key| key.to_string()).collect(),
        },
        upstream: UpstreamConfig {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            timeout_ms: 1_000,
            api_key: None,
        },
    }
}

/// Router plus handles to the pieces tests inspect
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub assessor: Arc<CountingAssessor>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config(&[]))
    }

    pub fn with_auth() -> Self {
        Self::with_config(test_config(&[TEST_API_KEY]))
    }

    pub fn with_config(config: AssessorConfig) -> Self {
        let assessor = Arc::new(CountingAssessor::new());
        let state = AppState::new(config, assessor.clone()).unwrap();
        Self {
            router: create_app(state.clone()),
            state,
            assessor,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn assess(&self, body: &Value) -> Response<Body> {
        self.send(assess_request(body, Some(TEST_API_KEY))).await
    }
}

pub fn assess_request(body: &Value, api_key: Option<&str>) -> Request<Body> {
    raw_assess_request(body.to_string(), api_key)
}

pub fn raw_assess_request(body: String, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/assess")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn get_request(uri: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn text_submission(student_response: &str) -> Value {
    json!({
        "taskKind": "text",
        "reference": "Photosynthesis converts light energy into chemical energy.",
        "template": "Explain photosynthesis in one sentence.",
        "studentResponse": student_response,
    })
}

pub fn image_submission(paths: &[&std::path::Path]) -> Value {
    json!({
        "taskKind": "image",
        "reference": "",
        "template": "Describe the diagram.",
        "studentResponse": "",
        "images": paths
            .iter()
            .map(|path| json!({"filePath": path, "mimeType": "image/png"}))
            .collect::<Vec<_>>(),
    })
}

pub fn cache_header(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get("x-cache")
        .and_then(|value| value.to_str().ok())
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
