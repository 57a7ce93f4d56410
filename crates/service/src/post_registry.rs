//! Identifier store: the ordered list of post ids kept in one hosted JSON bin.
//!
//! Reads are lenient (non-array documents and non-string entries are
//! ignored). Writes replace the whole document; there is no locking, so two
//! concurrent appends can lose one of the ids.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::errors::UpstreamError;

pub type PostId = String;

#[async_trait]
pub trait IdentifierStore: Send + Sync {
    async fn load(&self, bin: &str) -> Result<Vec<PostId>, UpstreamError>;
    async fn save(&self, bin: &str, ids: &[PostId]) -> Result<(), UpstreamError>;
}

/// Keep only string entries of a JSON array, in order.
pub fn ids_from_document(doc: &serde_json::Value) -> Vec<PostId> {
    doc.as_array()
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

/// Append `id` unless it is already present. Returns whether the list changed.
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use async_trait::async_trait;
/// use service::errors::UpstreamError;
/// use service::post_registry::{register_post, IdentifierStore, PostId};
///
/// #[derive(Default)]
/// struct Bin(Mutex<Vec<PostId>>);
///
/// #[async_trait]
/// impl IdentifierStore for Bin {
///     async fn load(&self, _bin: &str) -> Result<Vec<PostId>, UpstreamError> {
///         Ok(self.0.lock().unwrap().clone())
///     }
///     async fn save(&self, _bin: &str, ids: &[PostId]) -> Result<(), UpstreamError> {
///         *self.0.lock().unwrap() = ids.to_vec();
///         Ok(())
///     }
/// }
///
/// let bin = Bin::default();
/// assert!(tokio_test::block_on(register_post(&bin, "b", "abc")).unwrap());
/// assert!(!tokio_test::block_on(register_post(&bin, "b", "abc")).unwrap());
/// assert_eq!(*bin.0.lock().unwrap(), vec!["abc".to_string()]);
/// ```
#[instrument(skip(store))]
pub async fn register_post(store: &dyn IdentifierStore, bin: &str, id: &str) -> Result<bool, UpstreamError> {
    let mut ids = store.load(bin).await?;
    if ids.iter().any(|existing| existing == id) {
        debug!("post already registered");
        return Ok(false);
    }
    ids.push(id.to_string());
    store.save(bin, &ids).await?;
    info!(count = ids.len(), "post registered");
    Ok(true)
}

/// npoint.io bins: `GET /{bin}` returns the document, `POST /{bin}` replaces it.
#[derive(Clone)]
pub struct NpointStore {
    client: reqwest::Client,
    base_url: String,
}

impl NpointStore {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, bin: &str) -> String {
        format!("{}/{}", self.base_url, bin)
    }
}

#[async_trait]
impl IdentifierStore for NpointStore {
    async fn load(&self, bin: &str) -> Result<Vec<PostId>, UpstreamError> {
        let resp = self.client.get(self.url(bin)).send().await?;
        let status = resp.status();
        let doc = common::http::json_or_empty(resp).await;
        if !status.is_success() {
            return Err(UpstreamError::Status { status: status.as_u16(), body: doc });
        }
        Ok(ids_from_document(&doc))
    }

    async fn save(&self, bin: &str, ids: &[PostId]) -> Result<(), UpstreamError> {
        let resp = self.client.post(self.url(bin)).json(ids).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = common::http::json_or_empty(resp).await;
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }
        Ok(())
    }
}
