#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

//! # Assessor Core
//!
//! HTTP gateway in front of an LLM-backed assessment provider that skips
//! repeated scoring of identical submissions.
//!
//! ## Overview
//!
//! Scoring a student response is slow and billed per call, but
//! deterministic for the same inputs. Each cacheable request is reduced to a
//! canonical form, keyed with an HMAC-SHA256 fingerprint under a server
//! secret, and looked up in a byte-budgeted LRU with a TTL. Image tasks are
//! keyed by file content, never by path.
//!
//! ## Module Organization
//!
//! - [`assessment`] - request model, validation, and the [`Assessor`] seam
//! - [`cache`] - fingerprinting, bounded store, cacheability policy
//! - [`config`] - environment-driven configuration
//! - [`error`] - crate-level error type
//! - [`logging`] - tracing subscriber setup
//! - [`web`] - axum routes, handlers, and middleware
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use assessor_core::{create_app, AppState, AssessorConfig, UpstreamAssessor};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AssessorConfig::from_env()?;
//! let assessor = Arc::new(UpstreamAssessor::new(&config.upstream)?);
//! let app = create_app(AppState::new(config, assessor)?);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod assessment;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod web;

pub use assessment::{
    AssessError, AssessmentRequest, AssessmentResponse, Assessor, TaskKind, UpstreamAssessor,
};
pub use cache::{CachePolicy, CacheStats, Fingerprint, Fingerprinter, ResponseCache, SizedValue};
pub use config::{AssessorConfig, ConfigurationError};
pub use error::{AssessorError, AssessorResult};
pub use web::create_app;
pub use web::state::AppState;
