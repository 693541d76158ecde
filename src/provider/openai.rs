//! OpenAI-style chat completions backend.

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

const NAME: &str = "openai";
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const PLUGIN_KEY_VAR: &str = "EPIGRAM_OPENAI_API_KEY";
const GENERIC_KEY_VAR: &str = "OPENAI_API_KEY";
const MAX_GENERATIONS: u8 = 5;

pub struct OpenAiProvider {
    transport: Arc<dyn HttpTransport>,
}

impl OpenAiProvider {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    fn endpoint(config: &ProviderSettings) -> String {
        config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    fn build_body(config: &ProviderSettings, prompt: &str, diff_text: &str) -> serde_json::Value {
        let mut body = json!({
            "model": config.model,
            "n": config.generate,
            "messages": [
                {"role": "system", "content": prompt},
                {"role": "user", "content": diff_text},
            ],
        });
        if let Some(t) = config.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(p) = config.top_p {
            body["top_p"] = json!(p);
        }
        if let Some(p) = config.frequency_penalty {
            body["frequency_penalty"] = json!(p);
        }
        if let Some(p) = config.presence_penalty {
            body["presence_penalty"] = json!(p);
        }
        if let Some(t) = config.max_tokens {
            body["max_tokens"] = json!(t);
        }
        body
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl Provider for OpenAiProvider {
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
        let body = Self::build_body(config, &prompt, &super::diff_payload(diff));
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

        let value = super::parse_response_body(NAME, &response)?;
        let parsed: ChatCompletionsResponse =
            serde_json::from_value(value).map_err(|e| ProviderError::Parse {
                provider: NAME.to_string(),
                detail: e.to_string(),
            })?;

        let raw: Vec<String> = parsed
            .choices
            .into_iter()
            .map(|choice| choice.message.content)
            .collect();

        super::finish_candidates(NAME, raw)
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
        Ok(HashMap::from([(
            "Authorization".to_string(),
            format!("Bearer {key}"),
        )]))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_streaming: false,
            supports_multiple_generations: true,
            max_generations: MAX_GENERATIONS,
        }
    }
}
