//! # Cacheability Policy
//!
//! Decides whether the fingerprinter and response cache get involved at all.
//! Only the assessment endpoint is cached, only successful responses are
//! written, and cache keys are namespaced so other uses of the same store
//! cannot collide with assessment keys.

use super::errors::CacheResult;
use super::fingerprint::Fingerprinter;
use crate::assessment::AssessmentRequest;
use axum::http::{Method, StatusCode};

/// The one route whose responses are cached
pub const ASSESS_ROUTE: &str = "/api/v1/assess";

/// Prefix applied to every assessment cache key
pub const CACHE_KEY_NAMESPACE: &str = "assessor:";

#[derive(Debug, Clone)]
pub struct CachePolicy {
    fingerprinter: Fingerprinter,
}

impl CachePolicy {
    pub fn new(fingerprinter: Fingerprinter) -> Self {
        Self { fingerprinter }
    }

    pub fn is_request_cacheable(&self, method: &Method, path: &str) -> bool {
        *method == Method::POST && path == ASSESS_ROUTE
    }

    /// Namespaced fingerprint for a cacheable request, `None` otherwise
    pub fn derive_key(
        &self,
        method: &Method,
        path: &str,
        request: &AssessmentRequest,
    ) -> CacheResult<Option<String>> {
        if !self.is_request_cacheable(method, path) {
            return Ok(None);
        }

        let fingerprint = self.fingerprinter.fingerprint(request)?;
        Ok(Some(format!("{CACHE_KEY_NAMESPACE}{fingerprint}")))
    }

    /// Only 2xx responses may be written to the cache
    pub fn is_response_cacheable(&self, status: StatusCode) -> bool {
        status.is_success()
    }
}
