//! HTTP transport behind an injectable trait.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::TransportError;

/// Default timeout for provider HTTP requests (60 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable to override the default timeout.
const TIMEOUT_ENV_VAR: &str = "EPIGRAM_HTTP_TIMEOUT";

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

/// HTTP collaborator used by every provider.
///
/// This abstraction allows substituting the network in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST a JSON body and return the response body text.
    ///
    /// The body is returned for any HTTP status; backend-reported error
    /// payloads are a provider-level concern. Errors here are strictly
    /// transport-level (connection, TLS, timeout).
    async fn post(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: serde_json::Value,
    ) -> Result<String, TransportError>;
}

/// Transport backed by a shared reqwest client with a bounded timeout.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(get_timeout())
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: serde_json::Value,
    ) -> Result<String, TransportError> {
        let mut request = self.client.post(url).json(&body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| TransportError::RequestFailed {
            url: url.to_string(),
            detail: e.to_string(),
        })?;

        response.text().await.map_err(|e| TransportError::RequestFailed {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }
}
