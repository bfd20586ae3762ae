//! Cache error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while deriving cache keys
#[derive(Debug, Error)]
pub enum CacheError {
    /// An image referenced by the request could not be read
    #[error("Missing resource for image {index} '{}': {reason}", path.display())]
    MissingResource {
        index: usize,
        path: PathBuf,
        reason: String,
    },

    /// The fingerprint secret is unusable (empty)
    #[error("Invalid fingerprint secret: {0}")]
    InvalidSecret(String),

    /// Failed to serialize the canonical form of a request
    #[error("Cache serialization error: {0}")]
    SerializationError(String),
}

impl CacheError {
    pub fn missing_resource(
        index: usize,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MissingResource {
            index,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when the failure was caused by the request rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingResource { .. })
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        CacheError::SerializationError(error.to_string())
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_resource_display_includes_path() {
        let err = CacheError::missing_resource(2, "/tmp/absent.png", "No such file or directory");
        let message = err.to_string();
        assert!(message.contains("/tmp/absent.png"));
        assert!(message.contains("No such file"));
        assert!(message.contains("image 2"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_secret_error_is_not_client_error() {
        let err = CacheError::InvalidSecret("empty".to_string());
        assert!(!err.is_client_error());
    }
}
