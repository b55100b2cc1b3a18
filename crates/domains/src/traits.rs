//! # Core Traits (Ports)
//!
//! Adapters implement these traits; services only ever see the traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::auth::{AuthContext, RequestCredentials};
use crate::error::Result;
use crate::models::{NewPost, NewUser, Post, PostId, PostWithAuthor, User, UserId};
use crate::role::Role;

/// Data persistence contract for users and posts.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait BoardRepo: Send + Sync {
    // User Operations
    async fn find_user(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn create_user(&self, user: NewUser) -> anyhow::Result<User>;
    async fn set_role(&self, user_id: UserId, role: Role) -> anyhow::Result<()>;
    async fn set_additional_text(&self, user_id: UserId, text: &str) -> anyhow::Result<()>;

    // Post Operations

    /// Inserts the post and stamps the author's `last_post_time` with
    /// `post.created_at`. Both writes commit together or not at all.
    async fn create_post(&self, post: NewPost) -> anyhow::Result<Post>;
    async fn get_post(&self, id: PostId) -> anyhow::Result<Option<PostWithAuthor>>;
    /// Newest first.
    async fn list_posts(&self) -> anyhow::Result<Vec<PostWithAuthor>>;
    /// Returns `false` when no post had that id.
    async fn delete_post(&self, id: PostId) -> anyhow::Result<bool>;
    /// Case-sensitive substring match on the body; returns the count removed.
    async fn delete_posts_containing(&self, keyword: &str) -> anyhow::Result<u64>;
    /// Removes every post and restarts numbering at 1.
    async fn clear_posts(&self) -> anyhow::Result<()>;
}

/// Hashing of post passwords and account credentials.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Deterministic hex digest of a post password.
    fn post_password_hash(&self, password: &str) -> String;
    /// Credential stored on lazily created accounts.
    fn placeholder_account_hash(&self) -> anyhow::Result<String>;
}

/// Resolves who is calling from the claims attached to a request.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, credentials: &RequestCredentials) -> Result<AuthContext>;
}

/// Wall clock, injectable for cooldown tests.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
