use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorBodyDoc {
    pub error: String,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    pub status: Option<u16>,
}

#[derive(ToSchema)]
pub struct GallerySlideDoc {
    pub title: Option<String>,
    pub src: Option<String>,
    pub description: Option<String>,
    /// Abbreviated month and year, e.g. `Jul 2023`.
    pub date: Option<String>,
}

#[derive(ToSchema)]
pub struct PostsResponseDoc { pub posts: Vec<GallerySlideDoc> }

#[derive(ToSchema)]
pub struct UploadFormDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(rename = "images[]", value_type = Vec<String>, format = Binary)]
    pub images: Vec<Vec<u8>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::gallery::list_posts,
        crate::routes::gallery::carousel_settings,
        crate::routes::admin::upload,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBodyDoc,
            GallerySlideDoc,
            PostsResponseDoc,
            UploadFormDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "gallery"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
