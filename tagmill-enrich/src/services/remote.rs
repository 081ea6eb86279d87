//! Remote record API client
//!
//! One GET per identifier against `{base_url}/{identifier}`, with a fixed
//! request timeout. A non-success status is a *soft* failure: the record
//! becomes `{"error": "<status-code>"}` and the pipeline carries on, so a
//! missing remote record never sinks the rest of an object's enrichment.
//! Transport and parse failures are hard errors for the pipeline to catch.

use crate::services::xml_map;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default timeout for remote record requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Hard failures of the fetch step
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure: timeout, connection reset, DNS
    #[error("transport failure: {0}")]
    Transport(String),

    /// Response body was not well-formed markup
    #[error("malformed record markup: {0}")]
    Parse(String),
}

/// Remote record API client
pub struct RemoteClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch and parse the remote record for `identifier`.
    pub async fn fetch(&self, identifier: &str) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base_url, identifier);
        debug!(identifier = %identifier, "querying remote record API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("record request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            debug!(identifier = %identifier, status = %status, "remote API returned non-success status");
            return Ok(json!({ "error": status.as_str() }));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("failed to read record body: {e}")))?;

        xml_map::parse_document(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}
