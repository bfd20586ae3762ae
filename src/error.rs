//! Crate-level error type
//!
//! Each subsystem owns a focused error enum; `AssessorError` is what crosses
//! module boundaries and what the server binary reports at startup.

use crate::assessment::{AssessError, ValidationError};
use crate::cache::CacheError;
use crate::config::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssessorError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Assessment error: {0}")]
    Assessment(#[from] AssessError),

    #[error("Server error: {0}")]
    Server(String),
}

pub type AssessorResult<T> = std::result::Result<T, AssessorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_keep_context() {
        let err: AssessorError =
            ConfigurationError::missing_required_field("CACHE_HASH_SECRET", "cache configuration")
                .into();
        assert!(err.to_string().contains("CACHE_HASH_SECRET"));

        let err: AssessorError = CacheError::InvalidSecret("empty".to_string()).into();
        assert!(matches!(err, AssessorError::Cache(_)));

        let err: AssessorError = AssessError::UpstreamStatus {
            status: 503,
            body: "busy".to_string(),
        }
        .into();
        assert!(err.to_string().contains("503"));
    }
}
