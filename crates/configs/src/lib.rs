use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
    /// Upper bound on request bodies (multipart uploads).
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            frontend_dir: default_frontend_dir(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GalleryConfig {
    /// The single address allowed to upload.
    #[serde(default)]
    pub admin_email: String,
    #[serde(default = "default_max_upload_files")]
    pub max_upload_files: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub image_host: ImageHostConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            admin_email: String::new(),
            max_upload_files: default_max_upload_files(),
            request_timeout_secs: default_request_timeout(),
            image_host: ImageHostConfig::default(),
            store: StoreConfig::default(),
            identity: IdentityConfig::default(),
            carousel: CarouselConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageHostConfig {
    #[serde(default = "default_image_host_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for ImageHostConfig {
    fn default() -> Self {
        Self { base_url: default_image_host_url(), token: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_url")]
    pub base_url: String,
    #[serde(default)]
    pub bin_id: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { base_url: default_store_url(), bin_id: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,
    #[serde(default = "default_issuer_prefix")]
    pub issuer_prefix: String,
    #[serde(default = "default_jwks_ttl")]
    pub jwks_cache_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            jwks_url: default_jwks_url(),
            issuer_prefix: default_issuer_prefix(),
            jwks_cache_secs: default_jwks_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarouselConfig {
    #[serde(default = "default_auto_progress_ms")]
    pub auto_progress_ms: u64,
    #[serde(default = "default_idle_resume_ms")]
    pub idle_resume_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self { auto_progress_ms: default_auto_progress_ms(), idle_resume_ms: default_idle_resume_ms() }
    }
}

fn default_frontend_dir() -> String { "frontend".into() }
fn default_body_limit() -> usize { 20 * 1024 * 1024 }
/// Hard ceiling on files per upload; config may only lower it.
pub const MAX_UPLOAD_FILES: usize = 20;

fn default_max_upload_files() -> usize { MAX_UPLOAD_FILES }
fn default_request_timeout() -> u64 { 30 }
fn default_image_host_url() -> String { "https://api.imgchest.com/v1".into() }
fn default_store_url() -> String { "https://api.npoint.io".into() }
fn default_jwks_url() -> String {
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com".into()
}
fn default_issuer_prefix() -> String { "https://securetoken.google.com/".into() }
fn default_jwks_ttl() -> u64 { 3600 }
fn default_auto_progress_ms() -> u64 { 10_000 }
fn default_idle_resume_ms() -> u64 { 3_000 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (defaults when absent), overlay the environment and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// `lookup` resolves environment variables; tests pass a closure over a map.
    pub fn normalize_and_validate<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.apply_env(&lookup);
        self.server.normalize()?;
        self.gallery.apply_env(&lookup);
        self.gallery.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl ServerConfig {
    fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        if let Some(host) = non_empty(lookup("SERVER_HOST")) {
            self.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        if self.body_limit_bytes == 0 {
            self.body_limit_bytes = default_body_limit();
        }
        Ok(())
    }
}

impl GalleryConfig {
    fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        if let Some(email) = non_empty(lookup("ADMIN_EMAIL")) {
            self.admin_email = email;
        }
        self.admin_email = self.admin_email.trim().to_string();
        if let Some(token) = non_empty(lookup("IMG_CHEST_TOKEN")) {
            self.image_host.token = Some(token);
        }
        self.image_host.token = non_empty(self.image_host.token.take());
        if let Some(bin) = non_empty(lookup("NPOINT_ID")) {
            self.store.bin_id = Some(bin);
        }
        self.store.bin_id = non_empty(self.store.bin_id.take());
        if let Some(project) = non_empty(lookup("FIREBASE_PROJECT_ID")) {
            self.identity.project_id = project;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_upload_files == 0 || self.max_upload_files > MAX_UPLOAD_FILES {
            return Err(anyhow!("gallery.max_upload_files must be within 1..={MAX_UPLOAD_FILES}"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("gallery.request_timeout_secs must be a positive number of seconds"));
        }
        for (name, url) in [
            ("gallery.image_host.base_url", &self.image_host.base_url),
            ("gallery.store.base_url", &self.store.base_url),
            ("gallery.identity.jwks_url", &self.identity.jwks_url),
        ] {
            let lower = url.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("{name} must start with http:// or https://"));
            }
        }
        if self.carousel.auto_progress_ms == 0 {
            return Err(anyhow!("gallery.carousel.auto_progress_ms must be > 0"));
        }
        Ok(())
    }
}
