use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::errors::AuthError;

/// Claims the gallery relies on after a token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: Option<String>,
    pub email_verified: bool,
}

/// Verifies an identity token issued by an external provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
}

const JWKS_KEY: &str = "jwks";

/// Firebase ID token verifier: RS256 signatures checked against the
/// provider's published JWK set, audience pinned to the project id.
#[derive(Clone)]
pub struct FirebaseVerifier {
    client: reqwest::Client,
    jwks_url: String,
    project_id: String,
    issuer: String,
    keys: Cache<&'static str, Arc<JwkSet>>,
}

impl FirebaseVerifier {
    pub fn new(
        client: reqwest::Client,
        jwks_url: impl Into<String>,
        project_id: impl Into<String>,
        issuer_prefix: &str,
        cache_ttl: Duration,
    ) -> Self {
        let project_id = project_id.into();
        let issuer = format!("{issuer_prefix}{project_id}");
        let keys = Cache::builder().max_capacity(1).time_to_live(cache_ttl).build();
        Self { client, jwks_url: jwks_url.into(), project_id, issuer, keys }
    }

    pub fn from_config(client: reqwest::Client, cfg: &configs::IdentityConfig) -> Self {
        Self::new(
            client,
            cfg.jwks_url.clone(),
            cfg.project_id.clone(),
            &cfg.issuer_prefix,
            Duration::from_secs(cfg.jwks_cache_secs),
        )
    }

    async fn fetch_keys(&self) -> Result<Arc<JwkSet>, String> {
        debug!(url = %self.jwks_url, "fetching identity provider keys");
        let resp = self.client.get(&self.jwks_url).send().await.map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("status {}", resp.status()));
        }
        let set = resp.json::<JwkSet>().await.map_err(|e| e.to_string())?;
        Ok(Arc::new(set))
    }

    async fn cached_keys(&self) -> Result<Arc<JwkSet>, AuthError> {
        self.keys
            .try_get_with(JWKS_KEY, self.fetch_keys())
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let mut keys = self.cached_keys().await?;
        if keys.find(kid).is_none() {
            // Keys rotate; refetch once before giving up.
            self.keys.invalidate(JWKS_KEY).await;
            keys = self.cached_keys().await?;
        }
        let jwk = keys.find(kid).ok_or_else(|| AuthError::UnknownKey(kid.to_string()))?;
        DecodingKey::from_jwk(jwk).map_err(|e| AuthError::KeyFetch(e.to_string()))
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    #[instrument(skip(self, token))]
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        if self.project_id.trim().is_empty() {
            return Err(AuthError::Config("identity project id not set".into()));
        }
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!("unexpected algorithm {:?}", header.alg)));
        }
        let kid = header.kid.ok_or_else(|| AuthError::InvalidToken("missing kid".into()))?;
        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            warn!(err = %e, "identity token rejected");
            AuthError::InvalidToken(e.to_string())
        })?;
        Ok(VerifiedIdentity {
            subject: data.claims.sub,
            email: data.claims.email,
            email_verified: data.claims.email_verified.unwrap_or(false),
        })
    }
}
