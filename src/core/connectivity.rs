/// Connectivity check for a configured chat-completion endpoint.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::schema::settings::Settings;

/// How long the probe waits for the endpoint before giving up.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Non-2xx statuses that still prove the endpoint speaks the API.
const REACHABLE_ERROR_STATUSES: [u16; 4] = [400, 401, 403, 404];

#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("API URL is required")]
    MissingUrl,
    #[error("API token is required")]
    MissingToken,
    #[error("endpoint unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("endpoint returned unexpected status {0}")]
    UnexpectedStatus(u16),
}

/// Outcome of a successful probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub status: u16,
}

impl ConnectionStatus {
    /// True when the endpoint accepted the probe outright (2xx).
    pub fn accepted(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Whether a response status means "the endpoint is there and talking".
///
/// Success, bad request, unauthorized, forbidden and not found all count;
/// the probe payload is deliberately minimal, so rejections are expected.
pub fn is_reachable_status(status: u16) -> bool {
    (200..300).contains(&status) || REACHABLE_ERROR_STATUSES.contains(&status)
}

/// Reject settings that cannot be probed, without touching the network.
pub fn validate(settings: &Settings) -> Result<(), ConnectivityError> {
    if settings.api_url.trim().is_empty() {
        return Err(ConnectivityError::MissingUrl);
    }
    if settings.api_token.trim().is_empty() {
        return Err(ConnectivityError::MissingToken);
    }
    Ok(())
}

/// POST a minimal chat-completion payload and classify the response.
pub async fn check_connection(settings: &Settings) -> Result<ConnectionStatus, ConnectivityError> {
    check_connection_with_timeout(settings, CHECK_TIMEOUT).await
}

pub async fn check_connection_with_timeout(
    settings: &Settings,
    timeout: Duration,
) -> Result<ConnectionStatus, ConnectivityError> {
    validate(settings)?;

    let client = Client::builder().timeout(timeout).build()?;
    let payload = serde_json::json!({
        "model": "test",
        "messages": [],
        "max_tokens": 1
    });

    let url = settings.api_url.trim();
    debug!(url = %url, "probing endpoint");
    let resp = client
        .post(url)
        .bearer_auth(settings.api_token.trim())
        .json(&payload)
        .send()
        .await?;

    let status = resp.status().as_u16();
    if is_reachable_status(status) {
        info!(status, "endpoint reachable");
        Ok(ConnectionStatus { status })
    } else {
        Err(ConnectivityError::UnexpectedStatus(status))
    }
}
