//! # Posting pipeline
//!
//! validate → resolve or create the user → cooldown → hash → insert.
//! The insert and the user's `last_post_time` stamp are one storage write.

use std::sync::Arc;

use chrono::Duration;
use domains::{
    AppError, BoardPolicy, BoardRepo, Clock, CredentialHasher, NewPost, NewUser, PostId,
    PostView, PostWithAuthor, Result, Role, User,
};
use tracing::{debug, info};

/// What a poster sends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostSubmission {
    pub name: String,
    pub content: String,
    pub password: Option<String>,
    pub parent_id: Option<PostId>,
}

pub struct PostService {
    repo: Arc<dyn BoardRepo>,
    hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
    policy: BoardPolicy,
}

impl PostService {
    pub fn new(
        repo: Arc<dyn BoardRepo>,
        hasher: Arc<dyn CredentialHasher>,
        clock: Arc<dyn Clock>,
        policy: BoardPolicy,
    ) -> Self {
        Self {
            repo,
            hasher,
            clock,
            policy,
        }
    }

    /// Every post, newest first.
    pub async fn list(&self) -> Result<Vec<PostView>> {
        let posts = self.repo.list_posts().await?;
        Ok(posts.iter().map(PostWithAuthor::to_view).collect())
    }

    pub async fn submit(&self, submission: PostSubmission) -> Result<PostView> {
        let PostSubmission {
            name,
            content,
            password,
            parent_id,
        } = submission;

        if name.is_empty() || content.is_empty() {
            return Err(AppError::validation("name and content are required"));
        }

        // Replies may only point at posts that already exist, and every new
        // id is larger than any existing one, so the tree stays acyclic.
        if let Some(parent) = parent_id {
            if self.repo.get_post(parent).await?.is_none() {
                return Err(AppError::post_not_found(parent));
            }
        }

        let user = self.resolve_user(&name).await?;

        let now = self.clock.now();
        if let Some(last) = user.last_post_time {
            // A stamp from the future (clock stepped back) counts as just now.
            let elapsed = (now - last).max(Duration::zero());
            if elapsed < self.policy.cooldown {
                let remaining_secs = self.policy.cooldown.num_seconds() - elapsed.num_seconds();
                debug!(username = %user.username, remaining_secs, "cooldown active");
                return Err(AppError::RateLimited { remaining_secs });
            }
        }

        let password_hash = self
            .hasher
            .post_password_hash(password.as_deref().unwrap_or_default());

        let post = self
            .repo
            .create_post(NewPost {
                name,
                content,
                password_hash,
                created_at: now,
                user_id: user.id,
                parent_id,
            })
            .await?;
        info!(no = post.id, username = %user.username, parent = ?post.parent_id, "post created");

        Ok(PostWithAuthor {
            post,
            additional_text: user.additional_text,
            author_role: Some(user.role),
        }
        .to_view())
    }

    /// First post under a name seeds a base-tier account.
    ///
    /// Two first posts under one name may both miss the lookup; the one whose
    /// insert loses takes the row the other created.
    async fn resolve_user(&self, username: &str) -> Result<User> {
        if let Some(user) = self.repo.find_user(username).await? {
            return Ok(user);
        }
        let created = self
            .repo
            .create_user(NewUser {
                username: username.to_string(),
                password_hash: self.hasher.placeholder_account_hash()?,
                role: Role::Base,
            })
            .await;
        match created {
            Ok(user) => {
                info!(username, user_id = user.id, "user created");
                Ok(user)
            }
            Err(e) => match self.repo.find_user(username).await? {
                Some(user) => {
                    debug!(username, user_id = user.id, "user created concurrently");
                    Ok(user)
                }
                None => Err(e.into()),
            },
        }
    }
}
