//! Vertex-style generateContent backend authenticated through gcloud.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::auth::{CredentialCache, gcloud_installed};
use crate::config::ProviderSettings;
use crate::error::{AuthError, ProviderError};
use crate::git::StagedDiff;
use crate::message::build_prompt;

use super::gemini::{candidates_from_body, generate_content_body};
use super::{Capabilities, ConfigReport, HttpTransport, Provider};

const NAME: &str = "vertex";

/// The candidate count is fixed for this backend, not user-selectable.
const CANDIDATE_COUNT: u8 = 1;

pub struct VertexProvider {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<CredentialCache>,
}

impl VertexProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, credentials: Arc<CredentialCache>) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    fn endpoint(config: &ProviderSettings) -> String {
        let project = config.project.as_deref().unwrap_or_default();
        let location = config.location.as_deref().unwrap_or_default();
        let base = match config.endpoint.as_deref() {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{location}-aiplatform.googleapis.com"),
        };
        format!(
            "{base}/v1/projects/{project}/locations/{location}/publishers/google/models/{}:generateContent",
            config.model
        )
    }
}

#[async_trait]
impl Provider for VertexProvider {
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
        let body = generate_content_body(config, &prompt, &super::diff_payload(diff), CANDIDATE_COUNT);
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

        if config.model.trim().is_empty() {
            errors.push("model must not be empty".to_string());
        }
        if config.max_length == 0 {
            errors.push("max_length must be positive".to_string());
        }
        if config.generate != CANDIDATE_COUNT {
            errors.push(format!(
                "generate is fixed at {CANDIDATE_COUNT} for this backend"
            ));
        }
        if let Some(t) = config.temperature
            && !(0.0..=2.0).contains(&t)
        {
            errors.push("temperature must be between 0 and 2".to_string());
        }
        if config.project.as_deref().unwrap_or("").trim().is_empty() {
            errors.push("project is required".to_string());
        }
        if config.location.as_deref().unwrap_or("").trim().is_empty() {
            errors.push("location is required".to_string());
        }
        if !gcloud_installed() {
            errors.push("gcloud CLI not found on PATH".to_string());
        }

        ConfigReport { errors }
    }

    async fn get_auth_headers(
        &self,
        _config: &ProviderSettings,
    ) -> Result<HashMap<String, String>, AuthError> {
        let token = self.credentials.get_or_refresh().await?;
        Ok(HashMap::from([(
            "Authorization".to_string(),
            format!("Bearer {token}"),
        )]))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_streaming: false,
            supports_multiple_generations: false,
            max_generations: CANDIDATE_COUNT,
        }
    }
}
