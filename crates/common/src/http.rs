//! Shared outbound HTTP helpers
//!
//! All upstream clients (identity keys, image host, identifier store) go
//! through one `reqwest::Client` built here so timeouts and the user agent
//! stay consistent.

use std::time::Duration;

use crate::CoreError;

const USER_AGENT: &str = concat!("panorama-gallery/", env!("CARGO_PKG_VERSION"));

/// Build the shared client with a per-request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, CoreError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CoreError::Network(e.to_string()))
}

/// Read a response body as JSON, falling back to an empty object when the
/// body is empty or not JSON. Upstream error bodies are relayed verbatim, so a
/// malformed one must not turn into a second error.
pub async fn json_or_empty(resp: reqwest::Response) -> serde_json::Value {
    match resp.bytes().await {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|_| serde_json::json!({})),
        Err(_) => serde_json::json!({}),
    }
}

/// Read a response body as strict JSON.
pub async fn json_strict<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, CoreError> {
    resp.json::<T>()
        .await
        .map_err(|e| CoreError::Parse(e.to_string()))
}
