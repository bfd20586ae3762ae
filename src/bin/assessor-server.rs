//! # Assessor Server
//!
//! Standalone binary serving the assessment API with the response cache.
//!
//! ## Usage
//!
//! ```bash
//! CACHE_HASH_SECRET=change-me cargo run --bin assessor-server
//!
//! # Production logging
//! ASSESSOR_ENV=production LOG_FORMAT=json cargo run --release --bin assessor-server
//! ```

use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use assessor_core::logging;
use assessor_core::{create_app, AppState, AssessorConfig, UpstreamAssessor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    info!("🚀 Starting Assessor Server...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "   Build Mode: {}",
        if cfg!(debug_assertions) {
            "Debug"
        } else {
            "Release"
        }
    );
    info!("   Environment: {}", logging::get_environment());

    let config = AssessorConfig::from_env().context("Failed to load configuration")?;
    info!(config = %config.summary(), "Configuration loaded");

    let assessor = Arc::new(
        UpstreamAssessor::new(&config.upstream).context("Failed to build upstream assessor")?,
    );

    let bind_address = config.web.bind_address.clone();
    let app_state = AppState::new(config, assessor).context("Failed to build application state")?;
    let app = create_app(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;

    info!("🎉 Assessor Server listening on {bind_address}");
    info!("   Press Ctrl+C to shutdown gracefully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Assessor Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("🛑 Received SIGTERM, shutting down");
        },
    }
}
