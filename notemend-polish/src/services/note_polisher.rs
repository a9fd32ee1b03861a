//! Tiered note polishing with graceful degradation
//!
//! Walks an ordered list of completion model tiers; the first tier that
//! yields a validated non-empty result wins. When every tier fails the
//! caller gets the original note back under a sentinel model label, never an
//! error: the upstream clinical app must not be blocked by a completion
//! outage.

use tracing::{error, info, warn};

use super::completion_client::{CompletionClient, CompletionError};
use super::picc_normalizer::normalize_picc;
use super::prompt_builder::build_prompt;
use super::response_validator::validate_completion;

/// Sentinel model label for the degraded outcome where the original note is
/// returned unmodified
pub const RAW_FALLBACK: &str = "raw_fallback";

/// Final polishing outcome
#[derive(Debug, Clone)]
pub struct PolishOutcome {
    /// The polished note, or the original note when no tier succeeded
    pub polished_text: String,
    /// Identifier of the tier that produced the text, or "raw_fallback"
    pub model_used: String,
}

/// Tiered polishing pipeline
pub struct NotePolisher {
    client: CompletionClient,
    model_tiers: Vec<String>,
}

impl NotePolisher {
    pub fn new(client: CompletionClient, model_tiers: Vec<String>) -> Self {
        Self {
            client,
            model_tiers,
        }
    }

    /// Polish a nursing note.
    ///
    /// Tiers are evaluated strictly in order, one at a time; parallel
    /// speculative calls would waste quota and break first-success-wins
    /// semantics. Transport failures and empty output advance to the next
    /// tier identically. Exhaustion degrades to the original note verbatim.
    pub async fn polish(&self, note_text: &str) -> PolishOutcome {
        // Built once, reused across tiers
        let prompt = build_prompt(note_text);

        for tier in &self.model_tiers {
            match self.try_tier(tier, &prompt).await {
                Ok(text) => {
                    info!(model = %tier, "Completion tier succeeded");
                    return PolishOutcome {
                        polished_text: normalize_picc(&text),
                        model_used: tier.clone(),
                    };
                }
                Err(e) => {
                    warn!(model = %tier, error = %e, "Completion tier failed, trying next tier");
                }
            }
        }

        error!(
            tiers = self.model_tiers.len(),
            "All completion tiers failed, returning raw note"
        );

        PolishOutcome {
            polished_text: note_text.to_string(),
            model_used: RAW_FALLBACK.to_string(),
        }
    }

    async fn try_tier(&self, tier: &str, prompt: &str) -> Result<String, CompletionError> {
        let result = self.client.complete(tier, prompt).await?;
        validate_completion(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn offline_client() -> CompletionClient {
        CompletionClient::new(
            "http://127.0.0.1:9".to_string(),
            "test-key".to_string(),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_no_tiers_degrades_to_raw_note() {
        // With an empty tier list nothing is ever attempted
        let polisher = NotePolisher::new(offline_client(), vec![]);
        let outcome = polisher.polish("Pt resting comfortably.").await;
        assert_eq!(outcome.polished_text, "Pt resting comfortably.");
        assert_eq!(outcome.model_used, RAW_FALLBACK);
    }

    #[tokio::test]
    async fn test_raw_fallback_preserves_note_verbatim() {
        // The degraded path must not normalize; the caller gets their note back
        let polisher = NotePolisher::new(offline_client(), vec![]);
        let note = "PICC in situ 2 lumens draining clear fluid this shift.";
        let outcome = polisher.polish(note).await;
        assert_eq!(outcome.polished_text, note);
    }
}
