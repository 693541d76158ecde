//! Provider abstraction over the AI backends.
//!
//! Each backend implements [`Provider`] and owns its own request/response
//! mapping and validation rules; everything above the trait treats them
//! uniformly.

pub mod gemini;
pub mod openai;
pub mod registry;
pub mod transport;
pub mod vertex;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use registry::ProviderRegistry;
pub use transport::{HttpTransport, ReqwestTransport};
pub use vertex::VertexProvider;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::ProviderSettings;
use crate::error::{AuthError, ProviderError};
use crate::git::StagedDiff;
use crate::message::sanitize_messages;

/// Static description of what a backend supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub supports_streaming: bool,
    pub supports_multiple_generations: bool,
    pub max_generations: u8,
}

/// Outcome of a pure config validation pass. All failures are reported,
/// not just the first.
#[derive(Debug, Clone, Default)]
pub struct ConfigReport {
    pub errors: Vec<String>,
}

impl ConfigReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A named, stateless AI backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Registry name of the backend.
    fn name(&self) -> &'static str;

    /// Generate sanitized candidate commit messages for the staged diff.
    ///
    /// Surfaces, as distinct errors: transport failure, non-JSON body,
    /// backend-reported error payload, zero candidates extracted, and zero
    /// candidates surviving sanitization.
    async fn generate_commit_message(
        &self,
        diff: &StagedDiff,
        config: &ProviderSettings,
        commitlint_rules: Option<&str>,
    ) -> Result<Vec<String>, ProviderError>;

    /// Validate the provider's config table. Pure and deterministic for a
    /// given config and environment.
    fn validate_config(&self, config: &ProviderSettings) -> ConfigReport;

    /// Resolve the auth headers for a request.
    async fn get_auth_headers(
        &self,
        config: &ProviderSettings,
    ) -> Result<HashMap<String, String>, AuthError>;

    /// Static capability description.
    fn capabilities(&self) -> Capabilities;
}

impl std::fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").field("name", &self.name()).finish()
    }
}

/// Parse a response body, surfacing backend error payloads and non-JSON
/// bodies as distinct errors.
pub(crate) fn parse_response_body(
    provider: &str,
    body: &str,
) -> Result<serde_json::Value, ProviderError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|_| ProviderError::Parse {
            provider: provider.to_string(),
            detail: format!("non-JSON body: {}", snippet(body)),
        })?;

    if let Some(message) = error_payload_message(&value) {
        return Err(ProviderError::Api {
            provider: provider.to_string(),
            message,
        });
    }

    Ok(value)
}

fn error_payload_message(value: &serde_json::Value) -> Option<String> {
    let error = value.get("error")?;
    Some(
        error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
    )
}

fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Diff text as sent to a backend, with a marker when capture truncated it.
pub(crate) fn diff_payload(diff: &StagedDiff) -> String {
    if diff.truncated {
        format!("{}\n\n[diff truncated due to size]", diff.diff_text)
    } else {
        diff.diff_text.clone()
    }
}

/// Run raw candidates through the sanitizer, surfacing the zero-candidate
/// and all-filtered cases as distinct errors.
pub(crate) fn finish_candidates(
    provider: &str,
    raw: Vec<String>,
) -> Result<Vec<String>, ProviderError> {
    if raw.is_empty() {
        return Err(ProviderError::NoCandidates {
            provider: provider.to_string(),
        });
    }

    let sanitized = sanitize_messages(raw);
    if sanitized.is_empty() {
        return Err(ProviderError::EmptySanitized {
            provider: provider.to_string(),
        });
    }

    Ok(sanitized)
}

/// Validation checks shared by every backend.
pub(crate) fn validate_common(
    config: &ProviderSettings,
    max_generations: u8,
    errors: &mut Vec<String>,
) {
    if config.model.trim().is_empty() {
        errors.push("model must not be empty".to_string());
    }
    if config.max_length == 0 {
        errors.push("max_length must be positive".to_string());
    }
    if config.generate < 1 || config.generate > max_generations {
        errors.push(format!("generate must be between 1 and {max_generations}"));
    }
    if let Some(t) = config.temperature
        && !(0.0..=2.0).contains(&t)
    {
        errors.push("temperature must be between 0 and 2".to_string());
    }
}
