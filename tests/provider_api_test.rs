//! Integration tests for the HTTP providers against a mock server.

use std::sync::Arc;

use async_trait::async_trait;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use epigram::auth::{CredentialCache, TokenFetcher};
use epigram::config::ProviderSettings;
use epigram::error::AuthError;
use epigram::provider::{GeminiProvider, OpenAiProvider, Provider, ReqwestTransport, VertexProvider};
use epigram::{ProviderError, StagedDiff};

fn test_diff() -> StagedDiff {
    StagedDiff {
        files: vec!["a.ts".to_string(), "b.ts".to_string()],
        diff_text: "+const x = 1;\n-const x = 0;\n".to_string(),
        truncated: false,
    }
}

fn transport() -> Arc<ReqwestTransport> {
    Arc::new(ReqwestTransport::new().unwrap())
}

struct StaticTokenFetcher;

#[async_trait]
impl TokenFetcher for StaticTokenFetcher {
    async fn fetch_token(&self) -> Result<String, AuthError> {
        Ok("ya29.test-token".to_string())
    }
}

#[tokio::test]
async fn openai_round_trip_with_bearer_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "n": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"choices": [
                {"message": {"role": "assistant", "content": "feat: add x."}},
                {"message": {"role": "assistant", "content": "fix: y"}}
            ]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderSettings {
        api_key: Some("sk-test".to_string()),
        model: "gpt-4o-mini".to_string(),
        generate: 2,
        endpoint: Some(format!("{}/v1/chat/completions", server.uri())),
        ..ProviderSettings::default()
    };

    let provider = OpenAiProvider::new(transport());
    let result = provider
        .generate_commit_message(&test_diff(), &config, None)
        .await
        .unwrap();

    assert_eq!(result, vec!["feat: add x", "fix: y"]);
}

#[tokio::test]
async fn openai_error_payload_surfaces_as_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#,
        ))
        .mount(&server)
        .await;

    let config = ProviderSettings {
        api_key: Some("sk-bad".to_string()),
        model: "gpt-4o-mini".to_string(),
        endpoint: Some(format!("{}/v1/chat/completions", server.uri())),
        ..ProviderSettings::default()
    };

    let provider = OpenAiProvider::new(transport());
    let err = provider
        .generate_commit_message(&test_diff(), &config, None)
        .await
        .unwrap_err();

    match err {
        ProviderError::Api { message, .. } => assert!(message.contains("Incorrect API key")),
        other => panic!("Expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn openai_non_json_body_surfaces_as_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let config = ProviderSettings {
        api_key: Some("sk-test".to_string()),
        model: "gpt-4o-mini".to_string(),
        endpoint: Some(format!("{}/v1/chat/completions", server.uri())),
        ..ProviderSettings::default()
    };

    let provider = OpenAiProvider::new(transport());
    let err = provider
        .generate_commit_message(&test_diff(), &config, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Parse { .. }));
}

#[tokio::test]
async fn gemini_round_trip_with_api_key_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "AIza-test"))
        .and(body_partial_json(serde_json::json!({
            "generationConfig": {"candidateCount": 3}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "docs: update readme."}], "role": "model"}},
                {"content": {"parts": [{"text": "docs: update readme"}], "role": "model"}},
                {"content": {"parts": [{"text": "chore: tidy docs"}], "role": "model"}}
            ]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderSettings {
        api_key: Some("AIza-test".to_string()),
        model: "gemini-2.0-flash".to_string(),
        generate: 3,
        endpoint: Some(server.uri()),
        ..ProviderSettings::default()
    };

    let provider = GeminiProvider::new(transport());
    let result = provider
        .generate_commit_message(&test_diff(), &config, None)
        .await
        .unwrap();

    // Duplicates after sanitization collapse to the first occurrence.
    assert_eq!(result, vec!["docs: update readme", "chore: tidy docs"]);
}

#[tokio::test]
async fn gemini_empty_candidates_surface_as_no_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"candidates": []}"#))
        .mount(&server)
        .await;

    let config = ProviderSettings {
        api_key: Some("AIza-test".to_string()),
        model: "gemini-2.0-flash".to_string(),
        endpoint: Some(server.uri()),
        ..ProviderSettings::default()
    };

    let provider = GeminiProvider::new(transport());
    let err = provider
        .generate_commit_message(&test_diff(), &config, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::NoCandidates { .. }));
}

#[tokio::test]
async fn vertex_round_trip_with_cached_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(
            "/v1/projects/acme-ci/locations/us-central1/publishers/google/models/gemini-2.0-flash:generateContent",
        ))
        .and(header("Authorization", "Bearer ya29.test-token"))
        .and(body_partial_json(serde_json::json!({
            "generationConfig": {"candidateCount": 1}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "feat: wire vertex backend"}], "role": "model"}}
            ]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderSettings {
        model: "gemini-2.0-flash".to_string(),
        project: Some("acme-ci".to_string()),
        location: Some("us-central1".to_string()),
        endpoint: Some(server.uri()),
        ..ProviderSettings::default()
    };

    let credentials = Arc::new(CredentialCache::new(Box::new(StaticTokenFetcher)));
    let provider = VertexProvider::new(transport(), credentials);
    let result = provider
        .generate_commit_message(&test_diff(), &config, None)
        .await
        .unwrap();

    assert_eq!(result, vec!["feat: wire vertex backend"]);
}

#[tokio::test]
async fn unreachable_endpoint_surfaces_as_network_error() {
    // Nothing listens here; the request fails at the transport level.
    let config = ProviderSettings {
        api_key: Some("sk-test".to_string()),
        model: "gpt-4o-mini".to_string(),
        endpoint: Some("http://127.0.0.1:1/v1/chat/completions".to_string()),
        ..ProviderSettings::default()
    };

    let provider = OpenAiProvider::new(transport());
    let err = provider
        .generate_commit_message(&test_diff(), &config, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Network { .. }));
}
