use once_cell::sync::Lazy;
use prometheus::{register_int_counter, IntCounter};

// Prometheus metrics (default registry)
pub static UPLOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gallery_uploads_total",
        "Uploads accepted by the image host"
    )
    .expect("register uploads_total")
});

pub static UPLOADS_REJECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gallery_uploads_rejected_total",
        "Uploads rejected before reaching the image host"
    )
    .expect("register uploads_rejected_total")
});

pub static UPSTREAM_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gallery_upstream_errors_total",
        "Failed calls to the image host or identifier store"
    )
    .expect("register upstream_errors_total")
});

pub static REGISTRY_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gallery_registry_failures_total",
        "Uploaded posts that could not be recorded in the identifier store"
    )
    .expect("register registry_failures_total")
});

pub static LISTING_REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gallery_listing_requests_total",
        "Gallery listing requests"
    )
    .expect("register listing_requests_total")
});

/// Force registration so every counter shows up in `/metrics` from the start.
pub fn init() {
    Lazy::force(&UPLOADS_TOTAL);
    Lazy::force(&UPLOADS_REJECTED_TOTAL);
    Lazy::force(&UPSTREAM_ERRORS_TOTAL);
    Lazy::force(&REGISTRY_FAILURES_TOTAL);
    Lazy::force(&LISTING_REQUESTS_TOTAL);
}
