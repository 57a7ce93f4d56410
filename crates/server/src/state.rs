use std::sync::Arc;

use motion::CarouselSettings;
use service::gallery::GalleryService;

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub gallery: Arc<GalleryService>,
    pub carousel: Arc<CarouselSettings>,
}

impl AppState {
    pub fn new(gallery: GalleryService, carousel: CarouselSettings) -> Self {
        Self { gallery: Arc::new(gallery), carousel: Arc::new(carousel) }
    }
}
