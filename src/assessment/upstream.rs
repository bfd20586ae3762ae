//! # Upstream Assessor
//!
//! HTTP client for the LLM-backed scoring endpoint. The endpoint receives the
//! assessment request JSON as-is; prompt rendering and model selection happen
//! on its side.

use super::{AssessError, AssessmentRequest, AssessmentResponse, Assessor};
use crate::config::{ConfigurationError, UpstreamConfig};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, error, info};

/// Forwards assessment requests to the configured upstream URL
#[derive(Debug, Clone)]
pub struct UpstreamAssessor {
    client: Client,
    url: Url,
}

impl UpstreamAssessor {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ConfigurationError> {
        let url = Url::parse(&config.url).map_err(|e| ConfigurationError::InvalidValue {
            field: "ASSESSOR_UPSTREAM_URL".to_string(),
            value: config.url.clone(),
            context: e.to_string(),
        })?;

        let mut client_builder = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("assessor-core/{}", env!("CARGO_PKG_VERSION")));

        if let Some(api_key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let mut default_headers = reqwest::header::HeaderMap::new();
            default_headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {api_key}").parse().map_err(|_| {
                    ConfigurationError::InvalidValue {
                        field: "ASSESSOR_UPSTREAM_API_KEY".to_string(),
                        value: "[REDACTED]".to_string(),
                        context: "not a valid header value".to_string(),
                    }
                })?,
            );
            client_builder = client_builder.default_headers(default_headers);
        }

        let client = client_builder
            .build()
            .map_err(|e| ConfigurationError::ClientBuild(e.to_string()))?;

        info!(
            url = %url,
            timeout_ms = config.timeout_ms,
            authenticated = config.api_key.is_some(),
            "Created upstream assessor client"
        );

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Assessor for UpstreamAssessor {
    async fn assess(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentResponse, AssessError> {
        debug!(
            url = %self.url,
            task_kind = %request.task_kind,
            images = request.images.len(),
            "Forwarding assessment upstream"
        );

        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| AssessError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, "Upstream assessment failed");
            return Err(AssessError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<AssessmentResponse>()
            .await
            .map_err(|e| AssessError::InvalidResponse(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "upstream"
    }
}
