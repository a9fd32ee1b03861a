//! Note polishing endpoint
//!
//! POST /polish accepts a raw nursing note and returns the polished version
//! together with the identifier of the model that produced it.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::services::RAW_FALLBACK;
use crate::{ApiError, ApiResult, AppState};

/// Request payload for note polishing
#[derive(Debug, Deserialize)]
pub struct PolishRequest {
    /// The raw clinical nursing note. An absent field and an empty string
    /// are treated identically.
    #[serde(default)]
    pub nursing_note: String,
}

/// Response payload for note polishing
#[derive(Debug, Serialize)]
pub struct PolishResponse {
    /// The polished note, or the original note on graceful degradation
    pub polished_note: String,
    /// Tier identifier that produced the text, or "raw_fallback"
    pub model_used: String,
}

/// POST /polish handler
///
/// **Request:** `{"nursing_note": "..."}`
/// **Response:** `{"polished_note": "...", "model_used": "..."}`
///
/// **Behavior:**
/// 1. Reject absent/empty notes (400)
/// 2. Reject requests when no completion credential is configured (500),
///    before any outbound call is made
/// 3. Run the tiered polishing pipeline; model-side failures degrade to the
///    original note with `model_used: "raw_fallback"`, never an HTTP error
pub async fn polish_note(
    State(state): State<AppState>,
    Json(payload): Json<PolishRequest>,
) -> ApiResult<Json<PolishResponse>> {
    if payload.nursing_note.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Missing nursing_note in request body".to_string(),
        ));
    }

    let Some(polisher) = state.polisher.as_ref() else {
        return Err(ApiError::Config("OPENAI_API_KEY missing.".to_string()));
    };

    info!(note_chars = payload.nursing_note.len(), "Polishing nursing note");
    debug!(note = %payload.nursing_note, "Raw note");

    let outcome = polisher.polish(&payload.nursing_note).await;

    if outcome.model_used == RAW_FALLBACK {
        // Recorded for /health diagnostics; the pipeline already logged the
        // per-tier failures
        *state.last_error.write().await =
            Some("All completion tiers failed; returned raw note".to_string());
    } else {
        info!(
            model = %outcome.model_used,
            polished_chars = outcome.polished_text.len(),
            "Nursing note polished"
        );
        debug!(note = %outcome.polished_text, "Polished note");
    }

    Ok(Json(PolishResponse {
        polished_note: outcome.polished_text,
        model_used: outcome.model_used,
    }))
}

/// Build polish routes
pub fn polish_routes() -> Router<AppState> {
    Router::new().route("/polish", post(polish_note))
}
