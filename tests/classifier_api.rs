//! GeminiClient against a mock HTTP server: reply parsing and error paths.

use std::path::Path;
use tagboard::config::GeminiConfig;
use tagboard::gemini::{Classifier, GeminiClient};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_config(base: &str) -> GeminiConfig {
    GeminiConfig {
        api_base: base.to_string(),
        model: "gemini-2.0-flash".to_string(),
        request_timeout_ms: 5_000,
        max_content_chars: 4000,
    }
}

fn allowed() -> Vec<String> {
    vec!["finance".to_string(), "legal".to_string()]
}

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn candidate_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    })
}

#[tokio::test]
async fn test_classify_parses_fenced_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate_reply("```json\n[\"finance\"]\n```")),
        )
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server.uri()), "test-key".to_string()).unwrap();
    let keys = client
        .classify(Path::new("/docs/a.pdf"), "invoice text", &allowed())
        .await
        .unwrap();
    assert_eq!(keys, vec!["finance"]);
}

#[tokio::test]
async fn test_request_carries_allowed_keys_in_prompt() {
    let server = MockServer::start().await;
    // The prompt travels as the single text part; substring matches on the
    // serialized allowed keys are enough to pin the contract.
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("finance"))
        .and(body_string_contains("legal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_reply("[]")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server.uri()), "test-key".to_string()).unwrap();
    let keys = client
        .classify(Path::new("/docs/a.pdf"), "nothing relevant", &allowed())
        .await
        .unwrap();
    assert!(keys.is_empty());
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server.uri()), "test-key".to_string()).unwrap();
    let err = client
        .classify(Path::new("/docs/a.pdf"), "text", &allowed())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_reply_without_candidates_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server.uri()), "test-key".to_string()).unwrap();
    assert!(client
        .classify(Path::new("/docs/a.pdf"), "text", &allowed())
        .await
        .is_err());
}

#[tokio::test]
async fn test_prose_reply_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate_reply("The matching keys are finance and legal.")),
        )
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server.uri()), "test-key".to_string()).unwrap();
    assert!(client
        .classify(Path::new("/docs/a.pdf"), "text", &allowed())
        .await
        .is_err());
}
