use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, instrument, warn};

use super::domain::{GallerySlide, UploadRequest};
use crate::errors::{ServiceError, UpstreamError};
use crate::identity::{AdminGate, VerifiedIdentity};
use crate::image_host::{created_post_id, ImageHost, NewPost};
use crate::observability;
use crate::post_registry::{register_post, IdentifierStore};

/// Credentials and limits the gallery needs at request time.
#[derive(Debug, Clone)]
pub struct GallerySettings {
    pub host_token: Option<String>,
    pub bin_id: Option<String>,
    pub max_upload_files: usize,
}

impl GallerySettings {
    pub fn from_config(cfg: &configs::GalleryConfig) -> Self {
        Self {
            host_token: cfg.image_host.token.clone(),
            bin_id: cfg.store.bin_id.clone(),
            max_upload_files: cfg.max_upload_files,
        }
    }
}

/// Upload and listing flows over the image host and the identifier store.
#[derive(Clone)]
pub struct GalleryService {
    host: Arc<dyn ImageHost>,
    store: Arc<dyn IdentifierStore>,
    gate: AdminGate,
    settings: GallerySettings,
}

impl GalleryService {
    pub fn new(
        host: Arc<dyn ImageHost>,
        store: Arc<dyn IdentifierStore>,
        gate: AdminGate,
        settings: GallerySettings,
    ) -> Self {
        Self { host, store, gate, settings }
    }

    pub fn settings(&self) -> &GallerySettings {
        &self.settings
    }

    /// Check the caller's `Authorization` header against the admin address.
    pub async fn authorize(&self, authorization: Option<&str>) -> Result<VerifiedIdentity, ServiceError> {
        self.gate.authorize(authorization).await.map_err(|e| {
            warn!(code = e.code(), err = %e, "upload authorization failed");
            observability::UPLOADS_REJECTED_TOTAL.inc();
            ServiceError::Unauthorized(e.to_string())
        })
    }

    /// Reject empty or oversized submissions before anything goes upstream.
    pub fn validate_upload(&self, req: &UploadRequest) -> Result<(), ServiceError> {
        if req.images.is_empty() {
            return Err(ServiceError::Validation("No files provided".into()));
        }
        let max = self.settings.max_upload_files.min(configs::MAX_UPLOAD_FILES);
        if req.images.len() > max {
            return Err(ServiceError::Validation(format!("Max {max} files allowed")));
        }
        Ok(())
    }

    /// Forward an authorized upload to the image host and register the new
    /// post id. Returns the host's response body unchanged.
    #[instrument(skip(self, req), fields(images = req.images.len()))]
    pub async fn upload(&self, req: UploadRequest) -> Result<serde_json::Value, ServiceError> {
        self.validate_upload(&req).map_err(|e| {
            observability::UPLOADS_REJECTED_TOTAL.inc();
            e
        })?;
        let token = self
            .settings
            .host_token
            .as_deref()
            .ok_or_else(|| ServiceError::config("image host token"))?;

        let post = NewPost { title: req.title.filter(|t| !t.is_empty()), images: req.images };
        let body = match self.host.create_post(token, post).await {
            Ok(body) => body,
            Err(UpstreamError::Status { status, body }) => {
                observability::UPSTREAM_ERRORS_TOTAL.inc();
                warn!(status, "image host rejected upload");
                return Err(ServiceError::Relay { status, details: body });
            }
            Err(e) => {
                observability::UPSTREAM_ERRORS_TOTAL.inc();
                warn!(err = %e, "image host unreachable");
                return Err(ServiceError::Upstream(e.to_string()));
            }
        };
        observability::UPLOADS_TOTAL.inc();
        info!(post_id = ?created_post_id(&body), "upload accepted by image host");

        self.register_best_effort(&body).await;
        Ok(body)
    }

    /// Record the new post id in the identifier store. Never fails the upload.
    async fn register_best_effort(&self, body: &serde_json::Value) {
        let Some(id) = created_post_id(body) else {
            warn!("image host response has no post id; not registering");
            observability::REGISTRY_FAILURES_TOTAL.inc();
            return;
        };
        let Some(bin) = self.settings.bin_id.as_deref() else {
            warn!(post_id = %id, "identifier store not configured; not registering");
            observability::REGISTRY_FAILURES_TOTAL.inc();
            return;
        };
        if let Err(e) = register_post(self.store.as_ref(), bin, &id).await {
            warn!(post_id = %id, err = %e, "failed to register post id");
            observability::REGISTRY_FAILURES_TOTAL.inc();
        }
    }

    /// Every registered post as a slide, in store order. Posts that cannot be
    /// fetched become all-null slides.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<GallerySlide>, ServiceError> {
        observability::LISTING_REQUESTS_TOTAL.inc();
        let token = self
            .settings
            .host_token
            .as_deref()
            .ok_or_else(|| ServiceError::config("image host token"))?;
        let bin = self
            .settings
            .bin_id
            .as_deref()
            .ok_or_else(|| ServiceError::config("identifier store id"))?;

        let ids = self.store.load(bin).await.map_err(|e| {
            observability::UPSTREAM_ERRORS_TOTAL.inc();
            warn!(err = %e, "failed to fetch identifier store");
            ServiceError::StoreUnavailable { status: e.status() }
        })?;

        let fetches = ids.iter().map(|id| async move {
            match self.host.get_post(token, id).await {
                Ok(post) => GallerySlide::from_post(&post),
                Err(e) => {
                    observability::UPSTREAM_ERRORS_TOTAL.inc();
                    warn!(post_id = %id, err = %e, "failed to fetch post");
                    GallerySlide::unavailable()
                }
            }
        });
        let slides = join_all(fetches).await;
        info!(count = slides.len(), "gallery listing built");
        Ok(slides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_host::{HostedImage, HostedPost, UploadFile};
    use crate::test_support::{MemoryHost, MemoryStore, StaticVerifier};
    use serde_json::json;

    fn files(n: usize) -> Vec<UploadFile> {
        (0..n)
            .map(|i| UploadFile { file_name: format!("{i}.png"), content_type: Some("image/png".into()), bytes: vec![0] })
            .collect()
    }

    fn service(host: Arc<MemoryHost>, store: Arc<MemoryStore>, token: Option<&str>, bin: Option<&str>) -> GalleryService {
        let gate = AdminGate::new(Arc::new(StaticVerifier::admin("good", "admin@example.com")), "admin@example.com");
        let settings = GallerySettings {
            host_token: token.map(str::to_string),
            bin_id: bin.map(str::to_string),
            max_upload_files: 20,
        };
        GalleryService::new(host, store, gate, settings)
    }

    #[tokio::test]
    async fn rejects_bad_file_counts_before_upstream() {
        let host = Arc::new(MemoryHost::default());
        let svc = service(host.clone(), Arc::new(MemoryStore::with_bin("b", &[])), Some("t"), Some("b"));

        let none = svc.upload(UploadRequest::default()).await.unwrap_err();
        assert!(matches!(none, ServiceError::Validation(ref m) if m == "No files provided"));

        let many = svc.upload(UploadRequest { images: files(21), ..Default::default() }).await.unwrap_err();
        assert!(matches!(many, ServiceError::Validation(ref m) if m == "Max 20 files allowed"));
        assert_eq!(host.create_calls(), 0);

        assert!(svc.upload(UploadRequest { images: files(20), ..Default::default() }).await.is_ok());
    }

    #[tokio::test]
    async fn configured_limit_never_exceeds_twenty() {
        let host = Arc::new(MemoryHost::default());
        let mut svc = service(host.clone(), Arc::new(MemoryStore::with_bin("b", &[])), Some("t"), Some("b"));
        svc.settings.max_upload_files = 500;

        let many = svc.upload(UploadRequest { images: files(21), ..Default::default() }).await.unwrap_err();
        assert!(matches!(many, ServiceError::Validation(ref m) if m == "Max 20 files allowed"));
        assert_eq!(host.create_calls(), 0);
    }

    #[tokio::test]
    async fn unauthorized_callers_are_rejected() {
        let svc = service(Arc::new(MemoryHost::default()), Arc::new(MemoryStore::default()), Some("t"), Some("b"));
        assert!(svc.authorize(Some("Bearer good")).await.is_ok());
        assert!(matches!(svc.authorize(Some("Bearer bad")).await, Err(ServiceError::Unauthorized(_))));
        assert!(matches!(svc.authorize(None).await, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn missing_token_is_config_error() {
        let svc = service(Arc::new(MemoryHost::default()), Arc::new(MemoryStore::default()), None, Some("b"));
        let err = svc.upload(UploadRequest { images: files(1), ..Default::default() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
        assert!(matches!(svc.list().await, Err(ServiceError::Config(_))));
    }

    #[tokio::test]
    async fn upload_registers_id_once() -> anyhow::Result<()> {
        let host = Arc::new(MemoryHost::default().with_fixed_id("same"));
        let store = Arc::new(MemoryStore::with_bin("b", &["old"]));
        let svc = service(host.clone(), store.clone(), Some("t"), Some("b"));

        let req = UploadRequest { title: Some("Trip".into()), images: files(2), ..Default::default() };
        svc.upload(req.clone()).await?;
        svc.upload(req).await?;
        assert_eq!(store.ids("b"), vec!["old".to_string(), "same".to_string()]);
        assert_eq!(host.last_title().as_deref(), Some("Trip"));
        Ok(())
    }

    #[tokio::test]
    async fn registry_failure_does_not_fail_upload() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::with_bin("b", &[]));
        store.fail_writes(true);
        let svc = service(Arc::new(MemoryHost::default()), store.clone(), Some("t"), Some("b"));
        let body = svc.upload(UploadRequest { images: files(1), ..Default::default() }).await?;
        assert_eq!(body["data"]["id"], "post-1");
        assert!(store.ids("b").is_empty());

        // unreadable bin: nothing written, still success
        let svc = service(Arc::new(MemoryHost::default()), Arc::new(MemoryStore::default()), Some("t"), Some("missing"));
        assert!(svc.upload(UploadRequest { images: files(1), ..Default::default() }).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn upstream_rejection_is_relayed() {
        let host = Arc::new(MemoryHost::default().rejecting(413, json!({"error": "too big"})));
        let svc = service(host, Arc::new(MemoryStore::with_bin("b", &[])), Some("t"), Some("b"));
        match svc.upload(UploadRequest { images: files(1), ..Default::default() }).await {
            Err(ServiceError::Relay { status, details }) => {
                assert_eq!(status, 413);
                assert_eq!(details, json!({"error": "too big"}));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_upstream_error() {
        let host = Arc::new(MemoryHost::default().unreachable());
        let store = Arc::new(MemoryStore::with_bin("b", &[]));
        let svc = service(host.clone(), store.clone(), Some("t"), Some("b"));
        let err = svc.upload(UploadRequest { images: files(1), ..Default::default() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(ref m) if m.contains("connection refused")));
        assert_eq!(host.create_calls(), 1);
        assert!(store.ids("b").is_empty());
    }

    #[tokio::test]
    async fn listing_preserves_order_and_nulls_failures() -> anyhow::Result<()> {
        let host = Arc::new(MemoryHost::default());
        host.insert(
            "p1",
            HostedPost {
                id: Some("p1".into()),
                title: Some("One".into()),
                description: None,
                created: Some("2023-07-19T12:16:00Z".into()),
                images: vec![
                    HostedImage { id: None, link: Some("late".into()), position: Some(5.0) },
                    HostedImage { id: None, link: Some("early".into()), position: Some(1.0) },
                ],
            },
        );
        host.insert("p3", HostedPost { title: Some("Three".into()), ..Default::default() });
        let store = Arc::new(MemoryStore::with_bin("b", &["p1", "missing", "p3"]));
        let svc = service(host, store, Some("t"), Some("b"));

        let slides = svc.list().await?;
        assert_eq!(slides.len(), 3);
        assert_eq!(slides[0].title.as_deref(), Some("One"));
        assert_eq!(slides[0].src.as_deref(), Some("early"));
        assert_eq!(slides[0].date.as_deref(), Some("Jul 2023"));
        assert_eq!(slides[1], GallerySlide::unavailable());
        assert_eq!(slides[2].title.as_deref(), Some("Three"));
        Ok(())
    }

    #[tokio::test]
    async fn listing_store_failure_is_reported() {
        let svc = service(Arc::new(MemoryHost::default()), Arc::new(MemoryStore::default()), Some("t"), Some("nope"));
        assert!(matches!(svc.list().await, Err(ServiceError::StoreUnavailable { status: Some(404) })));
    }
}
