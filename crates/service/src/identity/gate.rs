use std::sync::Arc;

use tracing::{info, warn};

use super::errors::AuthError;
use super::verifier::{IdentityVerifier, VerifiedIdentity};

const BEARER: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingToken)?;
    let token = value.strip_prefix(BEARER).ok_or(AuthError::InvalidScheme)?.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Lets through only callers whose verified email is the configured admin address.
#[derive(Clone)]
pub struct AdminGate {
    verifier: Arc<dyn IdentityVerifier>,
    admin_email: String,
}

impl AdminGate {
    pub fn new(verifier: Arc<dyn IdentityVerifier>, admin_email: impl Into<String>) -> Self {
        Self { verifier, admin_email: admin_email.into().trim().to_string() }
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    pub async fn authorize(&self, header: Option<&str>) -> Result<VerifiedIdentity, AuthError> {
        let token = bearer_token(header)?;
        let identity = self.verifier.verify(token).await?;
        match identity.email.as_deref() {
            Some(email) if !self.admin_email.is_empty() && email == self.admin_email => {
                if !identity.email_verified {
                    warn!(subject = %identity.subject, "admin email not verified by provider");
                    return Err(AuthError::UnverifiedEmail);
                }
                info!(subject = %identity.subject, "admin authorized");
                Ok(identity)
            }
            other => {
                warn!(subject = %identity.subject, email = ?other, "verified identity is not the admin");
                Err(AuthError::NotAdmin)
            }
        }
    }
}
