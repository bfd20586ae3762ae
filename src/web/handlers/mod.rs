//! # Web API Request Handlers
//!
//! HTTP request handlers organized by functional area.

pub mod assess;
pub mod cache;
pub mod health;
