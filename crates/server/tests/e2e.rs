//! Full stack against stub upstream servers: real HTTP clients for the image
//! host and the identifier store, static identity verification.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use service::{
    gallery::{GalleryService, GallerySettings},
    identity::AdminGate,
    image_host::ImgChestClient,
    post_registry::NpointStore,
    test_support::StaticVerifier,
};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::cors::CorsLayer;

use motion::CarouselSettings;
use server::routes::{self, RouterOptions};
use server::state::AppState;

#[derive(Default)]
struct Upstream {
    bin: Value,
    posts: Vec<Value>,
}

type Shared = Arc<Mutex<Upstream>>;

async fn create_post(State(up): State<Shared>, headers: HeaderMap, mut form: Multipart) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer host-token") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "bad token" })));
    }
    let mut title = None;
    let mut images = Vec::new();
    while let Ok(Some(field)) = form.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = field.text().await.ok(),
            "images[]" => {
                let n = images.len();
                images.push(json!({ "id": format!("img{n}"), "link": format!("https://cdn.test/{n}.png"), "position": n + 1 }));
            }
            _ => {}
        }
    }
    let mut up = up.lock().await;
    let id = format!("remote{}", up.posts.len() + 1);
    let post = json!({ "id": id, "title": title, "created": "2024-03-02T08:00:00Z", "images": images });
    up.posts.push(post.clone());
    (StatusCode::OK, Json(json!({ "data": post })))
}

async fn get_post(State(up): State<Shared>, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    let up = up.lock().await;
    match up.posts.iter().find(|p| p["id"] == id.as_str()) {
        Some(p) => (StatusCode::OK, Json(json!({ "data": p }))),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "not found" }))),
    }
}

async fn read_bin(State(up): State<Shared>) -> Json<Value> {
    Json(up.lock().await.bin.clone())
}

async fn write_bin(State(up): State<Shared>, Json(doc): Json<Value>) -> StatusCode {
    up.lock().await.bin = doc;
    StatusCode::OK
}

async fn serve(app: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });
    Ok(format!("http://{}", addr))
}

async fn start() -> anyhow::Result<(String, Shared)> {
    let up: Shared = Arc::new(Mutex::new(Upstream { bin: json!([]), posts: Vec::new() }));
    let upstream_url = serve(
        Router::new()
            .route("/v1/post", post(create_post))
            .route("/v1/post/:id", get(get_post))
            .route("/bins/bin1", get(read_bin).post(write_bin))
            .with_state(up.clone()),
    )
    .await?;

    let client = reqwest::Client::new();
    let host = Arc::new(ImgChestClient::new(client.clone(), format!("{upstream_url}/v1/")));
    let store = Arc::new(NpointStore::new(client, format!("{upstream_url}/bins")));
    let gate = AdminGate::new(Arc::new(StaticVerifier::admin("id-token", "admin@example.com")), "admin@example.com");
    let settings = GallerySettings {
        host_token: Some("host-token".into()),
        bin_id: Some("bin1".into()),
        max_upload_files: 20,
    };
    let state = AppState::new(GalleryService::new(host, store, gate, settings), CarouselSettings::default());
    let opts = RouterOptions { frontend_dir: "/nonexistent-frontend-for-tests".into(), body_limit_bytes: 1024 * 1024 };
    let app_url = serve(routes::build_router(state, CorsLayer::very_permissive(), &opts)).await?;
    Ok((app_url, up))
}

fn png(name: &str) -> Part {
    Part::bytes(vec![1, 2, 3]).file_name(name.to_string())
}

#[tokio::test]
async fn e2e_upload_then_list() -> anyhow::Result<()> {
    let (base, up) = start().await?;
    let client = reqwest::Client::new();

    let form = Form::new()
        .text("title", "Harbour")
        .text("description", "kept locally only")
        .part("images[]", png("a.png"))
        .part("images[]", png("b.png"));
    let res = client
        .post(format!("{base}/api/admin/upload"))
        .bearer_auth("id-token")
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["id"], "remote1");
    assert_eq!(body["data"]["images"].as_array().map(Vec::len), Some(2));
    assert_eq!(up.lock().await.bin, json!(["remote1"]));

    // an id the host no longer knows about
    up.lock().await.bin = json!(["remote1", "deleted"]);

    let res = client.get(format!("{base}/api/posts")).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(
        body["posts"],
        json!([
            { "title": "Harbour", "src": "https://cdn.test/0.png", "description": null, "date": "Mar 2024" },
            { "title": null, "src": null, "description": null, "date": null },
        ])
    );
    Ok(())
}

#[tokio::test]
async fn e2e_non_array_bin_lists_nothing() -> anyhow::Result<()> {
    let (base, up) = start().await?;
    up.lock().await.bin = json!({ "unexpected": true });

    let res = reqwest::get(format!("{base}/api/posts")).await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "posts": [] }));
    Ok(())
}
