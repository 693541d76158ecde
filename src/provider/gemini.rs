//! Gemini-API-style generateContent backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::auth::{api_key_available, resolve_api_key};
use crate::config::ProviderSettings;
use crate::error::{AuthError, ProviderError};
use crate::git::StagedDiff;
use crate::message::build_prompt;

use super::{Capabilities, ConfigReport, HttpTransport, Provider};

const NAME: &str = "gemini";
const DEFAULT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const PLUGIN_KEY_VAR: &str = "EPIGRAM_GEMINI_API_KEY";
const GENERIC_KEY_VAR: &str = "GEMINI_API_KEY";
const MAX_GENERATIONS: u8 = 8;

pub struct GeminiProvider {
    transport: Arc<dyn HttpTransport>,
}

impl GeminiProvider {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    fn endpoint(config: &ProviderSettings) -> String {
        let base = config.endpoint.as_deref().unwrap_or(DEFAULT_BASE);
        format!(
            "{}/models/{}:generateContent",
            base.trim_end_matches('/'),
            config.model
        )
    }
}

/// Request body in the generateContent shape shared with the Vertex backend.
pub(crate) fn generate_content_body(
    config: &ProviderSettings,
    prompt: &str,
    diff_text: &str,
    candidate_count: u8,
) -> serde_json::Value {
    let mut generation_config = json!({ "candidateCount": candidate_count });
    if let Some(t) = config.temperature {
        generation_config["temperature"] = json!(t);
    }
    if let Some(p) = config.top_p {
        generation_config["topP"] = json!(p);
    }
    if let Some(t) = config.max_tokens {
        generation_config["maxOutputTokens"] = json!(t);
    }

    json!({
        "systemInstruction": {
            "parts": [{"text": prompt}]
        },
        "contents": [
            {"role": "user", "parts": [{"text": diff_text}]}
        ],
        "generationConfig": generation_config,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// One raw candidate message per response candidate, with its part texts
/// concatenated.
pub(crate) fn extract_candidates(response: GenerateContentResponse) -> Vec<String> {
    response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .concat()
        })
        .collect()
}

/// Shared response handling for the generateContent backends.
pub(crate) fn candidates_from_body(provider: &str, body: &str) -> Result<Vec<String>, ProviderError> {
    let value = super::parse_response_body(provider, body)?;
    let parsed: GenerateContentResponse =
        serde_json::from_value(value).map_err(|e| ProviderError::Parse {
            provider: provider.to_string(),
            detail: e.to_string(),
        })?;
    super::finish_candidates(provider, extract_candidates(parsed))
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn generate_commit_message(
        &self,
        diff: &StagedDiff,
        config: &ProviderSettings,
        commitlint_rules: Option<&str>,
    ) -> Result<Vec<String>, ProviderError> {
        let prompt = build_prompt(config.max_length, commitlint_rules);
        let headers = self.get_auth_headers(config).await?;
        let body = generate_content_body(config, &prompt, &super::diff_payload(diff), config.generate);
        let url = Self::endpoint(config);

        debug!("POST {} (model {})", url, config.model);
        let response = self
            .transport
            .post(&url, &headers, body)
            .await
            .map_err(|e| ProviderError::Network {
                provider: NAME.to_string(),
                detail: e.to_string(),
            })?;

        candidates_from_body(NAME, &response)
    }

    fn validate_config(&self, config: &ProviderSettings) -> ConfigReport {
        let mut errors = Vec::new();
        super::validate_common(config, MAX_GENERATIONS, &mut errors);
        if !api_key_available(PLUGIN_KEY_VAR, GENERIC_KEY_VAR, config) {
            errors.push(format!(
                "no API key: set api_key, {PLUGIN_KEY_VAR}, or {GENERIC_KEY_VAR}"
            ));
        }
        ConfigReport { errors }
    }

    async fn get_auth_headers(
        &self,
        config: &ProviderSettings,
    ) -> Result<HashMap<String, String>, AuthError> {
        let key = resolve_api_key(NAME, PLUGIN_KEY_VAR, GENERIC_KEY_VAR, config)?;
        Ok(HashMap::from([("x-goog-api-key".to_string(), key)]))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_streaming: false,
            supports_multiple_generations: true,
            max_generations: MAX_GENERATIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::provider::transport::MockHttpTransport;

    fn test_config() -> ProviderSettings {
        ProviderSettings {
            api_key: Some("AIza-test".to_string()),
            model: "gemini-2.0-flash".to_string(),
            ..ProviderSettings::default()
        }
    }

    fn test_diff() -> StagedDiff {
        StagedDiff {
            files: vec!["a.ts".to_string()],
            diff_text: "+added\n".to_string(),
            truncated: false,
        }
    }

    #[test]
    fn test_endpoint_uses_model_and_base_override() {
        let mut config = test_config();
        assert_eq!(
            GeminiProvider::endpoint(&config),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );

        config.endpoint = Some("http://localhost:8080/".to_string());
        assert_eq!(
            GeminiProvider::endpoint(&config),
            "http://localhost:8080/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_body_shape() {
        let mut config = test_config();
        config.temperature = Some(0.25);
        config.max_tokens = Some(256);

        let body = generate_content_body(&config, "the prompt", "the diff", 4);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "the prompt");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "the diff");
        assert_eq!(body["generationConfig"]["candidateCount"], 4);
        assert_eq!(body["generationConfig"]["temperature"], 0.25);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
        assert!(body["generationConfig"].get("topP").is_none());
    }

    #[test]
    fn test_extract_candidates_joins_parts_per_candidate() {
        let body = r#"{"candidates": [
            {"content": {"parts": [{"text": "feat: add "}, {"text": "streaming"}], "role": "model"}},
            {"content": {"parts": [{"text": "fix: y"}], "role": "model"}},
            {"content": null}
        ]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let candidates = extract_candidates(parsed);
        assert_eq!(candidates, vec!["feat: add streaming", "fix: y"]);
    }

    #[tokio::test]
    async fn test_generate_extracts_candidates() {
        let mut transport = MockHttpTransport::new();
        transport.expect_post().returning(|_, _, _| {
            Ok(r#"{"candidates": [
                {"content": {"parts": [{"text": "docs: update readme."}], "role": "model"}}
            ]}"#
            .to_string())
        });
        let provider = GeminiProvider::new(Arc::new(transport));

        let result = provider
            .generate_commit_message(&test_diff(), &test_config(), None)
            .await
            .unwrap();
        assert_eq!(result, vec!["docs: update readme"]);
    }

    #[tokio::test]
    async fn test_generate_surfaces_empty_candidates() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post()
            .returning(|_, _, _| Ok(r#"{"candidates": []}"#.to_string()));
        let provider = GeminiProvider::new(Arc::new(transport));

        let err = provider
            .generate_commit_message(&test_diff(), &test_config(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoCandidates { .. }));
    }

    #[tokio::test]
    async fn test_auth_headers_api_key() {
        let transport = MockHttpTransport::new();
        let provider = GeminiProvider::new(Arc::new(transport));
        let headers = provider.get_auth_headers(&test_config()).await.unwrap();
        assert_eq!(headers.get("x-goog-api-key").unwrap(), "AIza-test");
    }

    #[test]
    fn test_validate_config_allows_up_to_eight_generations() {
        let transport = MockHttpTransport::new();
        let provider = GeminiProvider::new(Arc::new(transport));

        let mut config = test_config();
        config.generate = 8;
        assert!(provider.validate_config(&config).is_valid());

        config.generate = 9;
        let report = provider.validate_config(&config);
        assert!(report.errors.iter().any(|e| e.contains("between 1 and 8")));
    }
}
