use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::Duration;
use domains::{BoardRepo, NewPost, NewUser, Post, PostId, PostWithAuthor, Role, User, UserId};
use integration_tests::{json_request, TestBoard};
use serde_json::json;
use storage_adapters::MemoryBoardRepo;
use tower::ServiceExt;

/// Memory store that hands control back to the runtime after every user
/// lookup, so concurrent requests interleave between lookup and insert.
struct YieldingRepo(MemoryBoardRepo);

#[async_trait]
impl BoardRepo for YieldingRepo {
    async fn find_user(&self, username: &str) -> anyhow::Result<Option<User>> {
        let found = self.0.find_user(username).await;
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        found
    }
    async fn create_user(&self, user: NewUser) -> anyhow::Result<User> {
        self.0.create_user(user).await
    }
    async fn set_role(&self, user_id: UserId, role: Role) -> anyhow::Result<()> {
        self.0.set_role(user_id, role).await
    }
    async fn set_additional_text(&self, user_id: UserId, text: &str) -> anyhow::Result<()> {
        self.0.set_additional_text(user_id, text).await
    }
    async fn create_post(&self, post: NewPost) -> anyhow::Result<Post> {
        self.0.create_post(post).await
    }
    async fn get_post(&self, id: PostId) -> anyhow::Result<Option<PostWithAuthor>> {
        self.0.get_post(id).await
    }
    async fn list_posts(&self) -> anyhow::Result<Vec<PostWithAuthor>> {
        self.0.list_posts().await
    }
    async fn delete_post(&self, id: PostId) -> anyhow::Result<bool> {
        self.0.delete_post(id).await
    }
    async fn delete_posts_containing(&self, keyword: &str) -> anyhow::Result<u64> {
        self.0.delete_posts_containing(keyword).await
    }
    async fn clear_posts(&self) -> anyhow::Result<()> {
        self.0.clear_posts().await
    }
}

#[tokio::test]
async fn first_post_creates_the_user_and_is_numbered_one() {
    let board = TestBoard::new();

    let (status, body) = board.post(json!({ "name": "alice", "content": "hello" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "post added");

    let post = &body["post"];
    assert_eq!(post["no"], 1);
    assert_eq!(post["raw_name"], "alice");
    // No password hashes the empty string.
    assert_eq!(post["name"], "alice@e3b0c44");
    assert_eq!(post["content"], "hello");
    assert_eq!(post["time"], "2024-05-01 12:00:00");
    assert_eq!(post["parent_id"], serde_json::Value::Null);
    assert_eq!(post["additional_text"], serde_json::Value::Null);
    assert_eq!(post["user_role"], "base");

    let user = board.repo.find_user("alice").await.unwrap().unwrap();
    assert_eq!(user.last_post_time.map(|t| t.to_rfc3339()), Some("2024-05-01T12:00:00+00:00".into()));
}

#[tokio::test]
async fn password_selects_the_hash_segment() {
    let board = TestBoard::new();

    let (status, body) = board
        .post(json!({ "name": "bob", "content": "x", "password": "secret" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["post"]["name"], "bob@2bb80d5");

    board.wait();
    let (_, body) = board
        .post(json!({ "name": "bob", "content": "y", "password": "" }))
        .await;
    assert_eq!(body["post"]["name"], "bob@e3b0c44");
}

#[tokio::test]
async fn second_post_inside_the_cooldown_is_rate_limited() {
    let board = TestBoard::new();
    board.post(json!({ "name": "alice", "content": "one" })).await;

    let request = json_request(
        Method::POST,
        "/posts",
        json!({ "name": "alice", "content": "two" }),
        &[],
    );
    let response = board.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "5");

    board.clock.advance(Duration::milliseconds(2300));
    let (status, body) = board.post(json!({ "name": "alice", "content": "two" })).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "posting too fast, wait 3 more second(s)");

    // Rejected attempts do not reset the window.
    board.clock.advance(Duration::milliseconds(2700));
    let (status, _) = board.post(json!({ "name": "alice", "content": "two" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(board.list().await.len(), 2);
}

#[tokio::test]
async fn cooldown_is_per_user() {
    let board = TestBoard::new();
    board.post(json!({ "name": "alice", "content": "one" })).await;
    let (status, _) = board.post(json!({ "name": "bob", "content": "one" })).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn missing_name_or_content_is_a_bad_request() {
    let board = TestBoard::new();
    for body in [
        json!({ "content": "x" }),
        json!({ "name": "alice" }),
        json!({ "name": "", "content": "x" }),
        json!({ "name": "alice", "content": "" }),
    ] {
        let (status, resp) = board.post(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"], "name and content are required");
    }
    assert!(board.list().await.is_empty());
    assert!(board.repo.find_user("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let board = TestBoard::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/posts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = board.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn replies_must_point_at_an_existing_post() {
    let board = TestBoard::new();
    board.post_as("alice", "root").await;

    let (status, body) = board
        .post(json!({ "name": "bob", "content": "re", "parent_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["post"]["parent_id"], 1);

    board.wait();
    let (status, body) = board
        .post(json!({ "name": "bob", "content": "re", "parent_id": 42 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "post \"42\" not found");
}

#[tokio::test]
async fn listing_is_newest_first() {
    let board = TestBoard::new();
    board.post_as("alice", "first").await;
    board.post_as("bob", "second").await;
    board.post_as("carol", "third").await;

    let posts = board.list().await;
    let numbers: Vec<i64> = posts.iter().map(|p| p["no"].as_i64().unwrap()).collect();
    assert_eq!(numbers, vec![3, 2, 1]);
    assert_eq!(posts[0]["content"], "third");
}

#[tokio::test]
async fn empty_board_lists_nothing() {
    let board = TestBoard::new();
    assert!(board.list().await.is_empty());
}

#[tokio::test]
async fn simultaneous_first_posts_under_one_name_never_fail_in_storage() {
    let board = TestBoard::with_repo(Arc::new(YieldingRepo(MemoryBoardRepo::new())));

    let ((first, first_body), (second, second_body)) = tokio::join!(
        board.post(json!({ "name": "alice", "content": "one" })),
        board.post(json!({ "name": "alice", "content": "two" })),
    );
    let mut statuses = vec![first, second];
    statuses.sort();
    assert_eq!(
        statuses,
        vec![StatusCode::CREATED, StatusCode::TOO_MANY_REQUESTS],
        "{first_body} / {second_body}"
    );

    assert_eq!(board.list().await.len(), 1);
    let alice = board.repo.find_user("alice").await.unwrap().unwrap();
    assert_eq!(alice.id, 1);
}
