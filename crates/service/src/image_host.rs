//! Image host (ImgChest v1) client.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::UpstreamError;

/// One file taken from the admin's multipart form.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A post to create on the image host.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: Option<String>,
    pub images: Vec<UploadFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostedImage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub position: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostedPost {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub images: Vec<HostedImage>,
}

/// The host wraps every post as `{ "data": ... }`.
#[derive(Debug, Deserialize)]
struct Envelope {
    data: HostedPost,
}

/// Post id from a successful create response (`data.id`).
pub fn created_post_id(body: &serde_json::Value) -> Option<String> {
    body.get("data")?
        .get("id")?
        .as_str()
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Create a post. A non-2xx answer is `UpstreamError::Status` carrying the
    /// upstream body so it can be relayed.
    async fn create_post(&self, token: &str, post: NewPost) -> Result<serde_json::Value, UpstreamError>;
    async fn get_post(&self, token: &str, id: &str) -> Result<HostedPost, UpstreamError>;
}

#[derive(Clone)]
pub struct ImgChestClient {
    client: reqwest::Client,
    base_url: String,
}

impl ImgChestClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn form(post: NewPost) -> Result<Form, UpstreamError> {
        let mut form = Form::new();
        if let Some(title) = post.title.filter(|t| !t.is_empty()) {
            form = form.text("title", title);
        }
        for file in post.images {
            let mut part = Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(ct) = file.content_type {
                part = part.mime_str(&ct)?;
            }
            form = form.part("images[]", part);
        }
        Ok(form)
    }
}

#[async_trait]
impl ImageHost for ImgChestClient {
    #[instrument(skip(self, token, post), fields(images = post.images.len()))]
    async fn create_post(&self, token: &str, post: NewPost) -> Result<serde_json::Value, UpstreamError> {
        let form = Self::form(post)?;
        let resp = self
            .client
            .post(format!("{}/post", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        let body = common::http::json_or_empty(resp).await;
        debug!(status = status.as_u16(), "image host create answered");
        if !status.is_success() {
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }
        Ok(body)
    }

    #[instrument(skip(self, token))]
    async fn get_post(&self, token: &str, id: &str) -> Result<HostedPost, UpstreamError> {
        let resp = self
            .client
            .get(format!("{}/post/{}", self.base_url, id))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = common::http::json_or_empty(resp).await;
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }
        let envelope: Envelope = common::http::json_strict(resp).await?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Multipart, Path},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use tokio::net::TcpListener;

    async fn create(headers: HeaderMap, mut mp: Multipart) -> (StatusCode, Json<serde_json::Value>) {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer tok") {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad token"})));
        }
        let mut title = None;
        let mut names = Vec::new();
        while let Some(field) = mp.next_field().await.unwrap() {
            match field.name() {
                Some("title") => title = Some(field.text().await.unwrap()),
                Some("images[]") => names.push(field.file_name().unwrap_or_default().to_string()),
                _ => {}
            }
        }
        (StatusCode::OK, Json(json!({"data": {"id": "p1", "title": title, "names": names}})))
    }

    async fn fetch(Path(id): Path<String>) -> (StatusCode, Json<serde_json::Value>) {
        match id.as_str() {
            "p1" => (
                StatusCode::OK,
                Json(json!({"data": {"id": "p1", "title": "T", "images": [{"link": "https://x/1.jpg", "position": 1}]}})),
            ),
            "junk" => (StatusCode::OK, Json(json!({"nope": true}))),
            _ => (StatusCode::NOT_FOUND, Json(json!({"error": "missing"}))),
        }
    }

    async fn spawn() -> String {
        let app = Router::new().route("/post", post(create)).route("/post/:id", get(fetch));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/")
    }

    fn file(name: &str) -> UploadFile {
        UploadFile { file_name: name.into(), content_type: Some("image/png".into()), bytes: vec![1, 2, 3] }
    }

    #[tokio::test]
    async fn create_forwards_title_and_files() -> anyhow::Result<()> {
        let client = ImgChestClient::new(reqwest::Client::new(), spawn().await);
        let post = NewPost { title: Some("Trip".into()), images: vec![file("a.png"), file("b.png")] };
        let body = client.create_post("tok", post).await?;
        assert_eq!(created_post_id(&body).as_deref(), Some("p1"));
        assert_eq!(body["data"]["title"], "Trip");
        assert_eq!(body["data"]["names"], json!(["a.png", "b.png"]));
        Ok(())
    }

    #[tokio::test]
    async fn create_relays_upstream_rejection() {
        let client = ImgChestClient::new(reqwest::Client::new(), spawn().await);
        let err = client.create_post("wrong", NewPost { title: None, images: vec![file("a.png")] }).await.unwrap_err();
        match err {
            UpstreamError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body["error"], "bad token");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_post_decodes_envelope() -> anyhow::Result<()> {
        let client = ImgChestClient::new(reqwest::Client::new(), spawn().await);
        let post = client.get_post("tok", "p1").await?;
        assert_eq!(post.title.as_deref(), Some("T"));
        assert_eq!(post.images[0].position, Some(1.0));

        assert_eq!(client.get_post("tok", "gone").await.unwrap_err().status(), Some(404));
        assert!(matches!(client.get_post("tok", "junk").await, Err(UpstreamError::Decode(_))));
        Ok(())
    }

    #[test]
    fn created_id_requires_string() {
        assert_eq!(created_post_id(&json!({"data": {"id": 5}})), None);
        assert_eq!(created_post_id(&json!({})), None);
        assert_eq!(created_post_id(&json!({"data": {"id": "abc"}})).as_deref(), Some("abc"));
    }
}
