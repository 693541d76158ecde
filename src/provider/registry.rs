//! Name-keyed provider registry and active-provider resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::auth::CredentialCache;
use crate::config::{ProviderSettings, Settings};
use crate::error::RegistryError;

use super::{GeminiProvider, HttpTransport, OpenAiProvider, Provider, VertexProvider};

/// Registry of AI backends, owned by the session context rather than any
/// global state. Entries are immutable after registration.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in backends, all sharing one
    /// transport and one credential cache.
    pub fn with_builtin(
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<CredentialCache>,
    ) -> Self {
        let mut registry = Self::new();
        registry.insert(Arc::new(OpenAiProvider::new(Arc::clone(&transport))));
        registry.insert(Arc::new(GeminiProvider::new(Arc::clone(&transport))));
        registry.insert(Arc::new(VertexProvider::new(transport, credentials)));
        registry
    }

    fn insert(&mut self, provider: Arc<dyn Provider>) {
        self.providers
            .insert(provider.name().to_string(), provider);
    }

    /// Register a provider under a name, overwriting any existing entry.
    /// Empty names are rejected.
    pub fn register(
        &mut self,
        name: &str,
        provider: Arc<dyn Provider>,
    ) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        self.providers.insert(name.to_string(), provider);
        Ok(())
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Registered provider names, sorted lexicographically.
    pub fn list(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// Resolve the active provider against the settings.
    ///
    /// Fails distinctly for: unset name, unregistered name (listing what is
    /// available), a provider disabled in config, and invalid config (all
    /// validation messages aggregated). On success returns the provider
    /// paired with its resolved config.
    pub fn get_active_provider(
        &self,
        settings: &Settings,
    ) -> Result<(Arc<dyn Provider>, ProviderSettings), RegistryError> {
        let name = settings
            .provider
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(RegistryError::ActiveProviderUnset)?;

        let provider = self.get(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
            available: self.list().join(", "),
        })?;

        let config = settings.provider_settings(name);
        if !config.enabled {
            return Err(RegistryError::Disabled {
                name: name.to_string(),
            });
        }

        let report = provider.validate_config(&config);
        if !report.is_valid() {
            return Err(RegistryError::InvalidConfig {
                name: name.to_string(),
                errors: report.errors,
            });
        }

        Ok((provider, config))
    }
}
