use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use common::{env::{ensure_env, warn_missing}, http::build_client, utils::logging::init_logging_from_env};
use configs::AppConfig;
use dotenvy::dotenv;
use motion::CarouselSettings;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, RouterOptions};
use crate::state::AppState;
use service::{
    gallery::{GalleryService, GallerySettings},
    identity::{AdminGate, FirebaseVerifier},
    image_host::ImgChestClient,
    observability,
    post_registry::NpointStore,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the production collaborators from configuration.
pub fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let g = &cfg.gallery;
    let client = build_client(Duration::from_secs(g.request_timeout_secs))?;

    let verifier = Arc::new(FirebaseVerifier::from_config(client.clone(), &g.identity));
    let gate = AdminGate::new(verifier, g.admin_email.clone());
    let host = Arc::new(ImgChestClient::new(client.clone(), g.image_host.base_url.clone()));
    let store = Arc::new(NpointStore::new(client, g.store.base_url.clone()));
    let gallery = GalleryService::new(host, store, gate, GallerySettings::from_config(g));

    let carousel = CarouselSettings::default().with_timing(
        Duration::from_millis(g.carousel.auto_progress_ms),
        Duration::from_millis(g.carousel.idle_resume_ms),
    );
    Ok(AppState::new(gallery, carousel))
}

/// Full application for a validated config.
pub fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = build_state(cfg)?;
    let opts = RouterOptions {
        frontend_dir: cfg.server.frontend_dir.clone(),
        body_limit_bytes: cfg.server.body_limit_bytes,
    };
    Ok(routes::build_router(state, build_cors(), &opts))
}

fn report_missing_credentials(cfg: &AppConfig) {
    let g = &cfg.gallery;
    warn_missing("ADMIN_EMAIL", !g.admin_email.is_empty());
    warn_missing("IMG_CHEST_TOKEN", g.image_host.token.is_some());
    warn_missing("NPOINT_ID", g.store.bin_id.is_some());
    warn_missing("FIREBASE_PROJECT_ID", !g.identity.project_id.is_empty());
}

/// Public entry: load configuration, then serve until Ctrl+C
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();
    let cfg = AppConfig::load_and_validate()?;
    serve(cfg).await
}

/// Serve a validated config; returns after a graceful shutdown.
pub async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
    ensure_env(&cfg.server.frontend_dir).await?;
    report_missing_credentials(&cfg);
    observability::init();

    let app = build_app(&cfg)?;

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(service = "server", %addr, "starting gallery server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!(service = "server", event = "shutdown_signal", "received Ctrl+C, draining connections");
}
