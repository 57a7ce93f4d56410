use axum::{extract::State, Json};
use motion::CarouselSettings;
use serde::Serialize;
use service::gallery::GallerySlide;

use crate::{errors::JsonApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub posts: Vec<GallerySlide>,
}

#[utoipa::path(
    get, path = "/api/posts", tag = "gallery",
    responses(
        (status = 200, description = "Gallery slides in store order", body = crate::openapi::PostsResponseDoc),
        (status = 500, description = "Server misconfigured", body = crate::openapi::ErrorBodyDoc),
        (status = 502, description = "Identifier store unavailable", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<PostsResponse>, JsonApiError> {
    let posts = state.gallery.list().await?;
    Ok(Json(PostsResponse { posts }))
}

#[utoipa::path(get, path = "/api/carousel", tag = "gallery", responses((status = 200, description = "Carousel settings for the gallery page")))]
pub async fn carousel_settings(State(state): State<AppState>) -> Json<CarouselSettings> {
    Json(state.carousel.as_ref().clone())
}
