//! Configuration surface: per-provider settings and file loading.
//!
//! The core only reads this; nothing here is mutated after load. Lookup
//! order for the config file: an explicit `--config` path, then
//! `.epigram.toml` in the working directory, then
//! `~/.config/epigram/config.toml`. The first file found wins wholesale.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Repo-local config file name.
pub const LOCAL_CONFIG_FILE: &str = ".epigram.toml";

/// Settings for one backend, as read from its `[providers.<name>]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    /// Endpoint override. Full URL for OpenAI-style backends, base URL for
    /// the Gemini and Vertex backends.
    pub endpoint: Option<String>,
    pub model: String,
    /// Hard character limit for the generated subject line.
    pub max_length: u32,
    /// Number of candidate messages to request.
    pub generate: u8,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Cloud project, required by the Vertex backend.
    pub project: Option<String>,
    /// Cloud region, required by the Vertex backend.
    pub location: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            endpoint: None,
            model: String::new(),
            max_length: 72,
            generate: 1,
            temperature: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            max_tokens: None,
            project: None,
            location: None,
        }
    }
}

impl ProviderSettings {
    /// Built-in defaults so a fresh install works with nothing but an API
    /// key in the environment.
    pub fn defaults_for(name: &str) -> Self {
        let model = match name {
            "openai" => "gpt-4o-mini",
            "gemini" | "vertex" => "gemini-2.0-flash",
            _ => "",
        };
        Self {
            model: model.to_string(),
            ..Self::default()
        }
    }
}

/// Top-level settings: the active provider name plus per-provider tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name of the active provider.
    pub provider: Option<String>,
    /// Per-provider tables keyed by provider name.
    pub providers: BTreeMap<String, ProviderSettings>,
}

impl Settings {
    /// Load settings from the first config file found, or defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(&local);
        }

        if let Some(dir) = dirs::config_dir() {
            let global = dir.join("epigram").join("config.toml");
            if global.is_file() {
                return Self::from_file(&global);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Parse settings from a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::ParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// Settings for a provider, with the built-in model default filled in
    /// when the config table omits one.
    pub fn provider_settings(&self, name: &str) -> ProviderSettings {
        match self.providers.get(name) {
            Some(stored) => {
                let mut settings = stored.clone();
                if settings.model.trim().is_empty() {
                    settings.model = ProviderSettings::defaults_for(name).model;
                }
                settings
            }
            None => ProviderSettings::defaults_for(name),
        }
    }
}
