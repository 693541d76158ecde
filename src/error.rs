//! Error types for epigram modules using thiserror.

use thiserror::Error;

/// Errors from config file loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Nothing staged. Stage changes with 'git add' before generating a commit message.")]
    NothingStaged,

    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),
}

/// Errors from credential resolution and the gcloud token exchange.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(
        "No API key found for {provider}. Set api_key in the config file or export {plugin_var} (or {generic_var})."
    )]
    MissingApiKey {
        provider: String,
        plugin_var: String,
        generic_var: String,
    },

    #[error(
        "gcloud CLI not found. Install the Google Cloud SDK: https://cloud.google.com/sdk/docs/install"
    )]
    GcloudNotInstalled,

    #[error("gcloud is not authenticated. Run 'gcloud auth login' and try again.")]
    GcloudNotAuthenticated,

    #[error("Failed to spawn gcloud: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("gcloud token fetch timed out after {0} seconds")]
    Timeout(u64),

    #[error("Failed to fetch access token: {0}")]
    TokenFetchFailed(String),
}

/// Transport-level HTTP failure (connection, TLS, timeout).
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("POST {url} failed: {detail}")]
    RequestFailed { url: String, detail: String },
}

/// Errors from provider request/response handling.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Network request to {provider} failed: {detail}")]
    Network { provider: String, detail: String },

    #[error("Failed to parse {provider} response: {detail}")]
    Parse { provider: String, detail: String },

    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    #[error("{provider} returned no commit message candidates")]
    NoCandidates { provider: String },

    #[error("All candidates from {provider} were empty after sanitization")]
    EmptySanitized { provider: String },
}

/// Errors from provider registration and active-provider resolution.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Provider name must not be empty")]
    EmptyName,

    #[error("No active provider configured. Set 'provider' in the config file or pass --provider.")]
    ActiveProviderUnset,

    #[error("Provider '{name}' is not registered. Available providers: {available}")]
    NotFound { name: String, available: String },

    #[error("Provider '{name}' is disabled in the config. Set enabled = true to use it.")]
    Disabled { name: String },

    #[error("Invalid config for provider '{name}': {}", errors.join("; "))]
    InvalidConfig { name: String, errors: Vec<String> },
}

/// Errors surfaced by the commit pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Selection prompt failed: {0}")]
    SelectionFailed(String),
}
