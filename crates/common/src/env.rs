//! Environment/runtime helpers
//!
//! Sanity checks run once at startup.

use tracing::warn;

/// Warn when the frontend asset directory is missing; static routes will 404.
pub async fn ensure_env(frontend_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(frontend_dir).await.is_err() {
        warn!(%frontend_dir, "frontend assets directory not found; static assets may 404");
    }
    Ok(())
}

/// Warn about each missing credential; the handlers that need them answer 500.
pub fn warn_missing(name: &str, present: bool) {
    if !present {
        warn!(setting = %name, "credential not configured; dependent endpoints will report a configuration error");
    }
}
