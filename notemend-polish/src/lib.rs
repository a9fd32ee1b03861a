//! notemend-polish library interface
//!
//! Exposes the application state, router construction, and the note
//! polishing pipeline for integration testing.

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use notemend_common::config::ServiceConfig;
use notemend_common::Error;

use crate::services::{CompletionClient, NotePolisher};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved service configuration (read-only after startup)
    pub config: Arc<ServiceConfig>,
    /// Polishing pipeline; absent when no completion credential is
    /// configured, so the polish endpoint can reject before any network call
    pub polisher: Option<Arc<NotePolisher>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last polish failure for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> notemend_common::Result<Self> {
        let polisher = match &config.openai_api_key {
            Some(api_key) => {
                let client = CompletionClient::new(
                    config.completion_base_url.clone(),
                    api_key.clone(),
                    Duration::from_secs(config.request_timeout_secs),
                )
                .map_err(|e| Error::Internal(format!("Completion client creation failed: {}", e)))?;

                Some(Arc::new(NotePolisher::new(client, config.model_tiers.clone())))
            }
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            polisher,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::polish_routes())
        .with_state(state)
}
