//! notemend-polish - Nursing Note Polishing Middleware
//!
//! Accepts a raw clinical nursing note over HTTP, delegates rewording to an
//! external chat-completion service with tiered-model fallback, and applies
//! deterministic PICC-line normalization to the result. Model-side failures
//! degrade to returning the original note so the upstream clinical app is
//! never blocked by a completion-service outage.

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use notemend_common::config::ServiceConfig;
use notemend_polish::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first, so the log level can come from it
    let config = ServiceConfig::load()?;

    // Initialize tracing; RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting notemend-polish (note polishing middleware)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Model tiers: {}", config.model_tiers.join(" -> "));

    if config.openai_api_key.is_none() {
        warn!("No completion credential configured; POST /polish will return 500 until OPENAI_API_KEY is set");
    }

    let port = config.port;
    let state = AppState::new(config)?;
    let app = notemend_polish::build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on http://0.0.0.0:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
