//! gcloud CLI token exchange.

use std::env;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::error::AuthError;

/// Default timeout for the gcloud subprocess (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable to override the default timeout.
const TIMEOUT_ENV_VAR: &str = "EPIGRAM_GCLOUD_TIMEOUT";

/// Get the configured subprocess timeout.
///
/// Reads from EPIGRAM_GCLOUD_TIMEOUT if set, otherwise uses the default of
/// 30 seconds. Logs a warning when the variable holds an invalid value.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Capability that exchanges local credentials for an access token.
///
/// This abstraction allows substituting the gcloud subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Fetch a fresh access token.
    async fn fetch_token(&self) -> Result<String, AuthError>;
}

/// Check if the gcloud CLI is installed and on PATH.
///
/// Uses the `which` crate for cross-platform executable detection.
pub fn gcloud_installed() -> bool {
    which::which("gcloud").is_ok()
}

/// Fetches access tokens by shelling out to `gcloud auth print-access-token`.
pub struct GcloudTokenFetcher;

#[async_trait]
impl TokenFetcher for GcloudTokenFetcher {
    async fn fetch_token(&self) -> Result<String, AuthError> {
        if !gcloud_installed() {
            return Err(AuthError::GcloudNotInstalled);
        }

        let timeout_duration = get_timeout();
        let timeout_secs = timeout_duration.as_secs();

        let output = timeout(
            timeout_duration,
            Command::new("gcloud")
                .args(["auth", "print-access-token"])
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output(),
        )
        .await
        .map_err(|_| AuthError::Timeout(timeout_secs))?
        .map_err(AuthError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(classify_failure(&stderr));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(AuthError::TokenFetchFailed(
                "gcloud returned an empty token".to_string(),
            ));
        }

        Ok(token)
    }
}

/// Map gcloud stderr to an actionable error.
fn classify_failure(stderr: &str) -> AuthError {
    let lower = stderr.to_lowercase();
    let unauthenticated = [
        "gcloud auth login",
        "no credentialed accounts",
        "reauthentication required",
        "could not automatically determine credentials",
        "do not currently have an active account",
    ];
    if unauthenticated.iter().any(|marker| lower.contains(marker)) {
        return AuthError::GcloudNotAuthenticated;
    }
    AuthError::TokenFetchFailed(stderr.trim().to_string())
}
