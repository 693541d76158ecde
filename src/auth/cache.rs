//! Time-bounded, single-flight access token cache.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::AuthError;

use super::gcloud::TokenFetcher;

/// Cached tokens are treated as valid for 55 minutes. gcloud access tokens
/// live for 60, and the margin avoids expiry races at use time.
pub const TOKEN_TTL: Duration = Duration::from_secs(55 * 60);

/// A fetched access token with its local expiry deadline.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub expires_at: Instant,
}

/// Process-wide cache holding at most one credential.
///
/// The slot mutex is held across the external fetch, so concurrent callers
/// with no valid cached token collapse into a single fetch: late arrivals
/// wait on the lock and then observe the freshly stored credential as a
/// cache hit.
pub struct CredentialCache {
    fetcher: Box<dyn TokenFetcher>,
    ttl: Duration,
    slot: Mutex<Option<Credential>>,
}

impl CredentialCache {
    pub fn new(fetcher: Box<dyn TokenFetcher>) -> Self {
        Self::with_ttl(fetcher, TOKEN_TTL)
    }

    /// Cache with a custom TTL. Used by tests to exercise expiry.
    pub fn with_ttl(fetcher: Box<dyn TokenFetcher>, ttl: Duration) -> Self {
        Self {
            fetcher,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached token, or fetch a fresh one.
    ///
    /// A failed fetch clears any stored credential so the next call retries
    /// from scratch; failures are never cached.
    pub async fn get_or_refresh(&self) -> Result<String, AuthError> {
        let mut slot = self.slot.lock().await;

        if let Some(credential) = slot.as_ref()
            && Instant::now() < credential.expires_at
        {
            debug!("Using cached access token");
            return Ok(credential.token.clone());
        }

        match self.fetcher.fetch_token().await {
            Ok(token) => {
                *slot = Some(Credential {
                    token: token.clone(),
                    expires_at: Instant::now() + self.ttl,
                });
                debug!("Fetched fresh access token");
                Ok(token)
            }
            Err(e) => {
                *slot = None;
                Err(e)
            }
        }
    }
}
