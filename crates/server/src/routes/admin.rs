use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use service::{gallery::UploadRequest, image_host::UploadFile};
use tracing::{debug, info};

use crate::{errors::JsonApiError, state::AppState};

const IMAGES_FIELD: &str = "images[]";
/// Name browsers give to file parts sent without one.
const UNNAMED_FILE: &str = "blob";

#[utoipa::path(
    post, path = "/api/admin/upload", tag = "admin",
    request_body(content = crate::openapi::UploadFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image host post object"),
        (status = 400, description = "No files or too many files", body = crate::openapi::ErrorBodyDoc),
        (status = 401, description = "Unauthorized", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Server misconfigured", body = crate::openapi::ErrorBodyDoc),
        (status = 502, description = "Image host unreachable", body = crate::openapi::ErrorBodyDoc)
    ),
    security(("bearer" = []))
)]
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let identity = state.gallery.authorize(authorization).await?;

    let multipart = multipart.map_err(|e| JsonApiError::bad_request(format!("Invalid form: {e}")))?;
    let req = read_upload_form(multipart).await?;
    info!(subject = %identity.subject, images = req.images.len(), "upload requested");

    let body = state.gallery.upload(req).await?;
    Ok(Json(body))
}

/// Collect `title`, `description` and every file under `images[]`.
/// Text values are kept as sent. Parts under `images[]` with neither a file
/// name nor a content type are plain strings and are skipped.
async fn read_upload_form(mut multipart: Multipart) -> Result<UploadRequest, JsonApiError> {
    let mut req = UploadRequest::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::bad_request(format!("Invalid form: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" | "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| JsonApiError::bad_request(format!("Invalid form: {e}")))?;
                let text = Some(text).filter(|t| !t.is_empty());
                if name == "title" { req.title = text } else { req.description = text }
            }
            IMAGES_FIELD => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                if file_name.is_none() && content_type.is_none() {
                    debug!("skipping plain-text images[] part");
                    continue;
                }
                let file_name = file_name.unwrap_or_else(|| UNNAMED_FILE.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| JsonApiError::bad_request(format!("Invalid form: {e}")))?;
                req.images.push(UploadFile { file_name, content_type, bytes: bytes.to_vec() });
            }
            other => debug!(field = %other, "ignoring unknown form field"),
        }
    }
    Ok(req)
}
