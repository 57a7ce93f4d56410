use thiserror::Error;

/// Reasons an upload request is not authorized
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingToken,
    #[error("authorization header is not a bearer token")]
    InvalidScheme,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("signing key {0} not published by identity provider")]
    UnknownKey(String),
    #[error("cannot fetch identity provider keys: {0}")]
    KeyFetch(String),
    #[error("token email is not the admin address")]
    NotAdmin,
    #[error("token email has not been verified by the identity provider")]
    UnverifiedEmail,
    #[error("identity verification misconfigured: {0}")]
    Config(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::MissingToken => 1001,
            AuthError::InvalidScheme => 1002,
            AuthError::InvalidToken(_) => 1003,
            AuthError::UnknownKey(_) => 1004,
            AuthError::NotAdmin => 1005,
            AuthError::UnverifiedEmail => 1006,
            AuthError::KeyFetch(_) => 1101,
            AuthError::Config(_) => 1200,
        }
    }
}
