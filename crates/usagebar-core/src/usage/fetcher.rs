//! HTTP fetcher for the usage endpoint.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};
use ureq::Agent;

use super::types::UsagePayload;

/// Default usage endpoint
pub const DEFAULT_USAGE_URL: &str = "https://api.anthropic.com/api/oauth/usage";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Beta feature header required by the usage endpoint
const BETA_HEADER: (&str, &str) = ("anthropic-beta", "oauth-2025-04-20");

/// User-Agent sent with every request
const USER_AGENT: &str = concat!("usagebar/", env!("CARGO_PKG_VERSION"));

/// Classified failure of a single fetch. Every variant is recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connect, DNS, TLS or timeout failure
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-2xx status
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// The body was not a usage JSON object
    #[error("invalid response body: {0}")]
    Parse(String),
}

impl FetchError {
    /// Short label for UI surfaces
    pub fn short_label(&self) -> String {
        match self {
            FetchError::Network(_) => "network error".to_string(),
            FetchError::Http { status, .. } => format!("HTTP {}", status),
            FetchError::Parse(_) => "bad response".to_string(),
        }
    }
}

/// Source of usage payloads (the HTTP fetcher in production, mocks in tests)
pub trait UsageSource: Send + Sync {
    /// Fetch the current usage with the given bearer token
    fn fetch(&self, token: &str) -> impl Future<Output = Result<UsagePayload, FetchError>> + Send;
}

/// Fetches usage from the HTTP endpoint with a bounded timeout.
///
/// TLS certificates are always verified; there is no insecure fallback.
#[derive(Clone)]
pub struct HttpUsageFetcher {
    agent: Agent,
    url: String,
}

impl HttpUsageFetcher {
    /// Create a fetcher for the given endpoint and timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            url: url.into(),
        }
    }

    /// Endpoint this fetcher talks to
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpUsageFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_USAGE_URL, DEFAULT_TIMEOUT)
    }
}

impl UsageSource for HttpUsageFetcher {
    /// Run the blocking request on the blocking pool
    async fn fetch(&self, token: &str) -> Result<UsagePayload, FetchError> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        let token = token.to_string();

        tokio::task::spawn_blocking(move || fetch_blocking(&agent, &url, &token))
            .await
            .map_err(|e| FetchError::Network(format!("fetch task failed: {}", e)))?
    }
}

fn fetch_blocking(agent: &Agent, url: &str, token: &str) -> Result<UsagePayload, FetchError> {
    debug!(url = %url, "Fetching usage");

    let mut response = agent
        .get(url)
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .header("User-Agent", USER_AGENT)
        .header("Authorization", &format!("Bearer {}", token))
        .header(BETA_HEADER.0, BETA_HEADER.1)
        .call()
        .map_err(classify_transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("unknown").to_string();
        warn!(status = status.as_u16(), reason = %reason, "Usage endpoint returned error status");
        return Err(FetchError::Http {
            status: status.as_u16(),
            reason,
        });
    }

    let body = response
        .body_mut()
        .read_to_string()
        .map_err(classify_transport_error)?;

    serde_json::from_str::<UsagePayload>(&body).map_err(|e| {
        warn!(error = %e, "Usage response is not a valid usage object");
        FetchError::Parse(e.to_string())
    })
}

fn classify_transport_error(err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::StatusCode(status) => FetchError::Http {
            status,
            reason: "unexpected status".to_string(),
        },
        other => {
            warn!(error = %other, "Usage request failed");
            FetchError::Network(other.to_string())
        }
    }
}
