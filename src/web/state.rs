//! # Web API Application State
//!
//! Shared state handed to every handler and middleware. The response cache
//! lives here, built once at startup and injected; there is no global cache.

use std::sync::Arc;
use tracing::info;

use crate::assessment::Assessor;
use crate::cache::{CachePolicy, Fingerprinter, ResponseCache, SizedValue};
use crate::config::AssessorConfig;
use crate::error::AssessorResult;
use crate::web::middleware::response_cache::CachedResponse;

/// Store holding buffered assessment responses, charged by body length
pub type ResponseStore = ResponseCache<SizedValue<CachedResponse>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AssessorConfig>,
    pub response_cache: Arc<ResponseStore>,
    pub cache_policy: Arc<CachePolicy>,
    pub assessor: Arc<dyn Assessor>,
}

impl AppState {
    /// Build state from validated configuration and a scoring backend
    pub fn new(config: AssessorConfig, assessor: Arc<dyn Assessor>) -> AssessorResult<Self> {
        let fingerprinter = Fingerprinter::new(&config.cache.hash_secret)?;
        let response_cache = ResponseStore::from_config(&config.cache);

        info!(
            max_size_bytes = config.cache.max_size_bytes,
            ttl_seconds = config.cache.ttl.as_secs(),
            assessor = assessor.name(),
            auth_enabled = config.web.auth_enabled(),
            "Application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            response_cache: Arc::new(response_cache),
            cache_policy: Arc::new(CachePolicy::new(fingerprinter)),
            assessor,
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("response_cache", &self.response_cache)
            .field("assessor", &self.assessor.name())
            .finish()
    }
}
