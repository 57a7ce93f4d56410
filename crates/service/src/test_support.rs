//! In-memory implementations of the upstream traits for tests and doc examples.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::errors::UpstreamError;
use crate::identity::{AuthError, IdentityVerifier, VerifiedIdentity};
use crate::image_host::{HostedPost, ImageHost, NewPost};
use crate::post_registry::{IdentifierStore, PostId};

/// Accepts exactly one token and maps it to one email.
pub struct StaticVerifier {
    token: String,
    email: String,
}

impl StaticVerifier {
    pub fn admin(token: &str, email: &str) -> Self {
        Self { token: token.into(), email: email.into() }
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        if token != self.token {
            return Err(AuthError::InvalidToken("unknown token".into()));
        }
        Ok(VerifiedIdentity { subject: "test-user".into(), email: Some(self.email.clone()), email_verified: true })
    }
}

#[derive(Default)]
struct HostState {
    posts: HashMap<String, HostedPost>,
    created: usize,
    last_title: Option<String>,
    fixed_id: Option<String>,
    reject: Option<(u16, serde_json::Value)>,
    unreachable: bool,
}

/// Image host keeping posts in a map. Created posts get ids `post-1`, `post-2`, ...
#[derive(Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
}

impl MemoryHost {
    /// Every created post reports the same id.
    pub fn with_fixed_id(self, id: &str) -> Self {
        self.state.lock().unwrap().fixed_id = Some(id.into());
        self
    }

    /// Every create call answers with this status and body.
    pub fn rejecting(self, status: u16, body: serde_json::Value) -> Self {
        self.state.lock().unwrap().reject = Some((status, body));
        self
    }

    /// Every create call fails before any response arrives.
    pub fn unreachable(self) -> Self {
        self.state.lock().unwrap().unreachable = true;
        self
    }

    pub fn insert(&self, id: &str, post: HostedPost) {
        self.state.lock().unwrap().posts.insert(id.into(), post);
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().created
    }

    pub fn last_title(&self) -> Option<String> {
        self.state.lock().unwrap().last_title.clone()
    }
}

#[async_trait]
impl ImageHost for MemoryHost {
    async fn create_post(&self, _token: &str, post: NewPost) -> Result<serde_json::Value, UpstreamError> {
        let mut state = self.state.lock().unwrap();
        state.created += 1;
        state.last_title = post.title.clone();
        if state.unreachable {
            return Err(UpstreamError::Transport("connection refused".into()));
        }
        if let Some((status, body)) = state.reject.clone() {
            return Err(UpstreamError::Status { status, body });
        }
        let id = state.fixed_id.clone().unwrap_or_else(|| format!("post-{}", state.created));
        let stored = HostedPost { id: Some(id.clone()), title: post.title, ..Default::default() };
        state.posts.insert(id.clone(), stored);
        Ok(json!({ "data": { "id": id, "images": post.images.len() } }))
    }

    async fn get_post(&self, _token: &str, id: &str) -> Result<HostedPost, UpstreamError> {
        let state = self.state.lock().unwrap();
        state
            .posts
            .get(id)
            .cloned()
            .ok_or(UpstreamError::Status { status: 404, body: json!({ "error": "not found" }) })
    }
}

/// Identifier store over named in-memory bins. Unknown bins answer 404.
#[derive(Default)]
pub struct MemoryStore {
    bins: Mutex<HashMap<String, Vec<PostId>>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    pub fn with_bin(bin: &str, ids: &[&str]) -> Self {
        let store = Self::default();
        store
            .bins
            .lock()
            .unwrap()
            .insert(bin.into(), ids.iter().map(|s| s.to_string()).collect());
        store
    }

    pub fn ids(&self, bin: &str) -> Vec<PostId> {
        self.bins.lock().unwrap().get(bin).cloned().unwrap_or_default()
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }
}

#[async_trait]
impl IdentifierStore for MemoryStore {
    async fn load(&self, bin: &str) -> Result<Vec<PostId>, UpstreamError> {
        self.bins
            .lock()
            .unwrap()
            .get(bin)
            .cloned()
            .ok_or(UpstreamError::Status { status: 404, body: json!({}) })
    }

    async fn save(&self, bin: &str, ids: &[PostId]) -> Result<(), UpstreamError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(UpstreamError::Transport("write refused".into()));
        }
        self.bins.lock().unwrap().insert(bin.into(), ids.to_vec());
        Ok(())
    }
}
