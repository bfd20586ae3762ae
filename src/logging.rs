//! # Tracing Module
//!
//! Environment-aware console logging using the tracing ecosystem.
//! Designed for containerized deployments where logs go to stdout.
//!
//! - `LOG_LEVEL`, then `RUST_LOG`, then an environment default set the filter
//! - `ASSESSOR_ENV`, then `APP_ENV`, name the environment (default `development`)
//! - `LOG_FORMAT=json` switches to one JSON object per line
//! - ANSI colors only when stdout is a terminal
//!
//! Cache keys are never logged in full; log sites use a short key prefix.

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console logging once per process
///
/// Safe to call repeatedly; later calls are no-ops. If another global
/// subscriber is already installed (for example by a test harness) it is kept.
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let json_output = use_json_format();
        let use_ansi = IsTerminal::is_terminal(&std::io::stdout()) && !json_output;

        let console_layer = if json_output {
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(EnvFilter::new(&log_level))
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(use_ansi)
                .with_filter(EnvFilter::new(&log_level))
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(console_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::info!(
                environment = %environment,
                log_level = %log_level,
                json = json_output,
                ansi_colors = use_ansi,
                "Console logging initialized"
            );
        }
    });
}

/// Current deployment environment name
pub fn get_environment() -> String {
    std::env::var("ASSESSOR_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Log filter from explicit variables, else the environment default
fn get_log_level(environment: &str) -> String {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        return level.to_lowercase();
    }

    if let Ok(level) = std::env::var("RUST_LOG") {
        return level.to_lowercase();
    }

    default_log_level(environment).to_string()
}

fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

fn use_json_format() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
