//! Credential resolution for the AI backends.
//!
//! Static API keys resolve in priority order:
//! 1. `api_key` in the provider's config table
//! 2. the plugin-specific environment variable (`EPIGRAM_*_API_KEY`)
//! 3. the provider's standard environment variable
//!
//! The Vertex backend uses short-lived access tokens from the gcloud CLI
//! instead, held in [`CredentialCache`].

pub mod cache;
pub mod gcloud;

pub use cache::{Credential, CredentialCache, TOKEN_TTL};
pub use gcloud::{GcloudTokenFetcher, TokenFetcher, gcloud_installed};

use std::env;

use crate::config::ProviderSettings;
use crate::error::AuthError;

/// Resolve a static API key for a backend.
pub fn resolve_api_key(
    provider: &str,
    plugin_var: &str,
    generic_var: &str,
    config: &ProviderSettings,
) -> Result<String, AuthError> {
    if let Some(key) = &config.api_key
        && !key.trim().is_empty()
    {
        return Ok(key.clone());
    }

    for var in [plugin_var, generic_var] {
        if let Ok(key) = env::var(var)
            && !key.trim().is_empty()
        {
            return Ok(key);
        }
    }

    Err(AuthError::MissingApiKey {
        provider: provider.to_string(),
        plugin_var: plugin_var.to_string(),
        generic_var: generic_var.to_string(),
    })
}

/// Check whether an API key is resolvable without exposing it.
pub fn api_key_available(plugin_var: &str, generic_var: &str, config: &ProviderSettings) -> bool {
    resolve_api_key("", plugin_var, generic_var, config).is_ok()
}
