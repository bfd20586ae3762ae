//! # Assessment
//!
//! Request model and the downstream scoring collaborator.
//!
//! The [`Assessor`] trait is the seam between the web layer and whatever
//! actually scores a submission. Production uses [`UpstreamAssessor`], which
//! forwards to the LLM-backed assessment endpoint; tests plug in counting
//! mocks.

pub mod request;
pub mod upstream;

pub use request::{
    AssessmentRequest, Content, ImageAttachment, TaskKind, ValidationError, MAX_CONTENT_BYTES,
    MAX_IMAGES,
};
pub use upstream::UpstreamAssessor;

use async_trait::async_trait;
use thiserror::Error;

/// Scores returned by the downstream provider, passed through untouched
pub type AssessmentResponse = serde_json::Value;

/// Failures of the downstream assessment call
#[derive(Debug, Error)]
pub enum AssessError {
    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Upstream returned an invalid body: {0}")]
    InvalidResponse(String),
}

/// Expensive, deterministic scoring call that the response cache fronts
#[async_trait]
pub trait Assessor: Send + Sync {
    async fn assess(&self, request: &AssessmentRequest)
        -> Result<AssessmentResponse, AssessError>;

    /// Name used in logs and health output
    fn name(&self) -> &'static str;
}
