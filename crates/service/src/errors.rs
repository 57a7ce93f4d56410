use common::CoreError;
use thiserror::Error;

/// Failure talking to one of the upstream HTTP APIs.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream returned status {status}")]
    Status { status: u16, body: serde_json::Value },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<CoreError> for UpstreamError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Network(msg) => UpstreamError::Transport(msg),
            CoreError::Parse(msg) => UpstreamError::Decode(msg),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("server misconfigured: {0}")]
    Config(String),
    /// Upstream rejected the upload; status and body are relayed to the caller.
    #[error("upload rejected by image host with status {status}")]
    Relay { status: u16, details: serde_json::Value },
    #[error("identifier store unavailable")]
    StoreUnavailable { status: Option<u16> },
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl ServiceError {
    pub fn config(setting: &str) -> Self {
        Self::Config(format!("{setting} missing"))
    }
}
