//! End-to-end polishing pipeline tests against a mock completion service
//!
//! wiremock stands in for the external chat-completion API so tier
//! fallback order, call counts, and graceful degradation can be asserted
//! precisely.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notemend_common::config::ServiceConfig;
use notemend_polish::services::{CompletionClient, NotePolisher, RAW_FALLBACK};
use notemend_polish::{build_router, AppState};

const NOTE: &str = "Pt alert and oriented. PICC in situ 2 lumens draining clear fluid this shift.";

/// OpenAI-shaped completion body with a single choice
fn completion_body(text: &str) -> Value {
    json!({
        "id": "cmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": text } }
        ]
    })
}

async fn polisher_for(server: &MockServer, tiers: &[&str]) -> NotePolisher {
    let client = CompletionClient::new(
        server.uri(),
        "test-key".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();
    NotePolisher::new(client, tiers.iter().map(|t| t.to_string()).collect())
}

/// Mount a mock for one model tier; `expected_calls` is verified when the
/// server drops
async fn mount_tier(server: &MockServer, tier: &str, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({ "model": tier })))
        .respond_with(response)
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_primary_success_short_circuits() {
    let server = MockServer::start().await;
    mount_tier(
        &server,
        "tier-a",
        ResponseTemplate::new(200).set_body_json(completion_body("The patient was alert and oriented.")),
        1,
    )
    .await;
    // The secondary tier must never be invoked
    mount_tier(&server, "tier-b", ResponseTemplate::new(200), 0).await;

    let polisher = polisher_for(&server, &["tier-a", "tier-b"]).await;
    let outcome = polisher.polish(NOTE).await;

    assert_eq!(outcome.model_used, "tier-a");
    assert_eq!(outcome.polished_text, "The patient was alert and oriented.");
}

#[tokio::test]
async fn test_transport_failure_falls_back_to_secondary() {
    let server = MockServer::start().await;
    mount_tier(
        &server,
        "tier-a",
        ResponseTemplate::new(500).set_body_string("upstream exploded"),
        1,
    )
    .await;
    mount_tier(
        &server,
        "tier-b",
        ResponseTemplate::new(200).set_body_json(completion_body("The patient remained stable.")),
        1,
    )
    .await;

    let polisher = polisher_for(&server, &["tier-a", "tier-b"]).await;
    let outcome = polisher.polish(NOTE).await;

    assert_eq!(outcome.model_used, "tier-b");
    assert_eq!(outcome.polished_text, "The patient remained stable.");
}

#[tokio::test]
async fn test_empty_choices_advance_tier_like_transport_failure() {
    let server = MockServer::start().await;
    mount_tier(
        &server,
        "tier-a",
        ResponseTemplate::new(200).set_body_json(json!({ "id": "cmpl-1", "choices": [] })),
        1,
    )
    .await;
    mount_tier(
        &server,
        "tier-b",
        ResponseTemplate::new(200).set_body_json(completion_body("The patient remained stable.")),
        1,
    )
    .await;

    let polisher = polisher_for(&server, &["tier-a", "tier-b"]).await;
    let outcome = polisher.polish(NOTE).await;

    assert_eq!(outcome.model_used, "tier-b");
}

#[tokio::test]
async fn test_all_tiers_failing_returns_raw_note() {
    let server = MockServer::start().await;
    mount_tier(&server, "tier-a", ResponseTemplate::new(500), 1).await;
    mount_tier(&server, "tier-b", ResponseTemplate::new(503), 1).await;

    let polisher = polisher_for(&server, &["tier-a", "tier-b"]).await;
    let outcome = polisher.polish(NOTE).await;

    assert_eq!(outcome.model_used, RAW_FALLBACK);
    // Original note comes back verbatim, PICC text untouched
    assert_eq!(outcome.polished_text, NOTE);
}

#[tokio::test]
async fn test_model_output_is_picc_normalized() {
    let server = MockServer::start().await;
    mount_tier(
        &server,
        "tier-a",
        ResponseTemplate::new(200).set_body_json(completion_body(
            "Wounds:\nPICC in situ 2 lumens draining clear fluid this shift.",
        )),
        1,
    )
    .await;

    let polisher = polisher_for(&server, &["tier-a"]).await;
    let outcome = polisher.polish(NOTE).await;

    assert_eq!(
        outcome.polished_text,
        "Wounds:\nPICC line in situ, X2 lumens draining clear fluid this shift."
    );
}

// ---------------------------------------------------------------------------
// Full HTTP surface against the mock completion service
// ---------------------------------------------------------------------------

fn app_state_for(server_uri: String, api_key: Option<&str>) -> AppState {
    let config = ServiceConfig {
        openai_api_key: api_key.map(|key| key.to_string()),
        completion_base_url: server_uri,
        model_tiers: vec!["tier-a".to_string(), "tier-b".to_string()],
        request_timeout_secs: 5,
        ..ServiceConfig::default()
    };
    AppState::new(config).unwrap()
}

fn post_polish(note: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/polish")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "nursing_note": note }).to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_polish_endpoint_end_to_end() {
    let server = MockServer::start().await;
    mount_tier(
        &server,
        "tier-a",
        ResponseTemplate::new(200).set_body_json(completion_body("CNS: The patient was alert.")),
        1,
    )
    .await;

    let app = build_router(app_state_for(server.uri(), Some("test-key")));
    let response = app.oneshot(post_polish(NOTE)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["polished_note"], "CNS: The patient was alert.");
    assert_eq!(body["model_used"], "tier-a");
}

#[tokio::test]
async fn test_polish_endpoint_degrades_with_200_not_500() {
    let server = MockServer::start().await;
    mount_tier(&server, "tier-a", ResponseTemplate::new(500), 1).await;
    mount_tier(&server, "tier-b", ResponseTemplate::new(500), 1).await;

    let app = build_router(app_state_for(server.uri(), Some("test-key")));
    let response = app.oneshot(post_polish(NOTE)).await.unwrap();

    // A completion outage must never surface as an HTTP failure
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["polished_note"], NOTE);
    assert_eq!(body["model_used"], "raw_fallback");
}

#[tokio::test]
async fn test_missing_credential_makes_no_outbound_calls() {
    let server = MockServer::start().await;
    // Any request reaching the mock at all is a failure
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = build_router(app_state_for(server.uri(), None));
    let response = app.oneshot(post_polish(NOTE)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response_json(response).await;
    assert_eq!(body["error"], "OPENAI_API_KEY missing.");
}
