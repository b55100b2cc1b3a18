//! Shared fixtures: a full router over a board store and a hand-driven
//! clock, plus small request helpers.

use std::sync::Arc;

use api_adapters::{router, AppState, IdentityHeaders};
use auth_adapters::{Sha256CredentialHasher, TrustedHeaderIdentity};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use domains::{BoardPolicy, BoardRepo, NewUser, Role};
use serde_json::Value;
use services::clock::ManualClock;
use services::{CommandService, PostService};
use storage_adapters::MemoryBoardRepo;
use tower::ServiceExt;

pub const ROLE_HEADER: &str = "X-User-Role";
pub const USER_HEADER: &str = "X-User-Name";

pub struct TestBoard {
    pub repo: Arc<dyn BoardRepo>,
    pub clock: Arc<ManualClock>,
    pub app: Router,
}

impl TestBoard {
    pub fn new() -> Self {
        Self::with_repo(Arc::new(MemoryBoardRepo::new()))
    }

    pub fn with_repo(repo: Arc<dyn BoardRepo>) -> Self {
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let state = AppState {
            posts: Arc::new(PostService::new(
                repo.clone(),
                Arc::new(Sha256CredentialHasher),
                clock.clone(),
                BoardPolicy::default(),
            )),
            commands: Arc::new(CommandService::new(repo.clone())),
            identity: Arc::new(TrustedHeaderIdentity),
            headers: IdentityHeaders::new(ROLE_HEADER, USER_HEADER).unwrap(),
        };
        Self {
            repo,
            clock,
            app: router(state),
        }
    }

    /// Moves past the posting cooldown.
    pub fn wait(&self) {
        self.clock.advance(Duration::seconds(60));
    }

    /// Creates `username` holding `role`, bypassing the posting path.
    pub async fn user_with_role(&self, username: &str, role: Role) {
        let user = self
            .repo
            .create_user(NewUser {
                username: username.into(),
                password_hash: "x".into(),
                role,
            })
            .await
            .unwrap();
        assert_eq!(user.role, role);
    }

    pub async fn role_of(&self, username: &str) -> Role {
        self.repo.find_user(username).await.unwrap().unwrap().role
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn post(&self, body: Value) -> (StatusCode, Value) {
        self.send(json_request(Method::POST, "/posts", body, &[])).await
    }

    pub async fn list(&self) -> Vec<Value> {
        let request = Request::get("/posts").body(Body::empty()).unwrap();
        let (status, body) = self.send(request).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().cloned().unwrap()
    }

    /// Posts as `name` and moves the clock past the cooldown.
    pub async fn post_as(&self, name: &str, content: &str) -> Value {
        let (status, body) = self
            .post(serde_json::json!({ "name": name, "content": content }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        self.wait();
        body["post"].clone()
    }

    /// Runs a slash command as a caller holding `role`.
    pub async fn command(&self, role: &str, username: Option<&str>, command: &str) -> (StatusCode, Value) {
        let mut headers = vec![(ROLE_HEADER, role)];
        if let Some(username) = username {
            headers.push((USER_HEADER, username));
        }
        self.send(json_request(
            Method::POST,
            "/command",
            serde_json::json!({ "command": command }),
            &headers,
        ))
        .await
    }
}

impl Default for TestBoard {
    fn default() -> Self {
        Self::new()
    }
}

pub fn json_request(method: Method, uri: &str, body: Value, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
