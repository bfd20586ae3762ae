//! # Web API Middleware
//!
//! Request-scoped layers applied around the routers in [`crate::web::create_app`]:
//!
//! - [`request_id`] - correlation ID on every request and response
//! - [`auth`] - API-key check for protected routes
//! - [`response_cache`] - fingerprint-keyed replay of assessment responses

pub mod auth;
pub mod request_id;
pub mod response_cache;
