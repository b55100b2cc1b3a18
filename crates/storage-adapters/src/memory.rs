//! In-process [`BoardRepo`] for tests and throwaway deployments.
//!
//! Posts live in an arena keyed by their sequential id; a reply holds its
//! parent's id. Everything sits behind one lock, so each call is atomic.

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use async_trait::async_trait;
use domains::{
    BoardRepo, NewPost, NewUser, Post, PostId, PostWithAuthor, Role, User, UserId,
};
use parking_lot::Mutex;

const FIRST_ID: i64 = 1;

#[derive(Debug)]
struct Arena {
    users: BTreeMap<UserId, User>,
    next_user_id: UserId,
    posts: BTreeMap<PostId, Post>,
    next_post_id: PostId,
}

impl Arena {
    fn user_mut(&mut self, id: UserId) -> anyhow::Result<&mut User> {
        self.users
            .get_mut(&id)
            .with_context(|| format!("user {id} does not exist"))
    }

    fn with_author(&self, post: &Post) -> PostWithAuthor {
        let author = post.user_id.and_then(|id| self.users.get(&id));
        PostWithAuthor {
            post: post.clone(),
            additional_text: author.and_then(|u| u.additional_text.clone()),
            author_role: author.map(|u| u.role),
        }
    }

    /// Replies to removed posts become top-level posts.
    fn detach_replies(&mut self, removed: &[PostId]) {
        for post in self.posts.values_mut() {
            if post.parent_id.is_some_and(|p| removed.contains(&p)) {
                post.parent_id = None;
            }
        }
    }
}

#[derive(Debug)]
pub struct MemoryBoardRepo {
    arena: Mutex<Arena>,
}

impl MemoryBoardRepo {
    pub fn new() -> Self {
        Self {
            arena: Mutex::new(Arena {
                users: BTreeMap::new(),
                next_user_id: FIRST_ID,
                posts: BTreeMap::new(),
                next_post_id: FIRST_ID,
            }),
        }
    }
}

impl Default for MemoryBoardRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BoardRepo for MemoryBoardRepo {
    async fn find_user(&self, username: &str) -> anyhow::Result<Option<User>> {
        let arena = self.arena.lock();
        Ok(arena
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> anyhow::Result<User> {
        let mut arena = self.arena.lock();
        if arena.users.values().any(|u| u.username == user.username) {
            bail!("username {:?} already exists", user.username);
        }
        let id = arena.next_user_id;
        arena.next_user_id += 1;

        let created = User {
            id,
            username: user.username,
            password_hash: Some(user.password_hash),
            role: user.role,
            is_killed: false,
            is_banned: false,
            additional_text: None,
            display_color: "#000000".to_string(),
            last_post_time: None,
        };
        arena.users.insert(id, created.clone());
        Ok(created)
    }

    async fn set_role(&self, user_id: UserId, role: Role) -> anyhow::Result<()> {
        self.arena.lock().user_mut(user_id)?.role = role;
        Ok(())
    }

    async fn set_additional_text(&self, user_id: UserId, text: &str) -> anyhow::Result<()> {
        self.arena.lock().user_mut(user_id)?.additional_text = Some(text.to_string());
        Ok(())
    }

    async fn create_post(&self, post: NewPost) -> anyhow::Result<Post> {
        let mut arena = self.arena.lock();
        if let Some(parent) = post.parent_id {
            if !arena.posts.contains_key(&parent) {
                bail!("parent post {parent} does not exist");
            }
        }
        // Validate the author before taking an id so a failure changes nothing.
        arena.user_mut(post.user_id)?.last_post_time = Some(post.created_at);

        let id = arena.next_post_id;
        arena.next_post_id += 1;
        let created = Post {
            id,
            name: post.name,
            content: post.content,
            password_hash: Some(post.password_hash),
            created_at: post.created_at,
            user_id: Some(post.user_id),
            parent_id: post.parent_id,
        };
        arena.posts.insert(id, created.clone());
        Ok(created)
    }

    async fn get_post(&self, id: PostId) -> anyhow::Result<Option<PostWithAuthor>> {
        let arena = self.arena.lock();
        Ok(arena.posts.get(&id).map(|p| arena.with_author(p)))
    }

    async fn list_posts(&self) -> anyhow::Result<Vec<PostWithAuthor>> {
        let arena = self.arena.lock();
        let mut posts: Vec<PostWithAuthor> =
            arena.posts.values().map(|p| arena.with_author(p)).collect();
        posts.sort_by(|a, b| {
            b.post
                .created_at
                .cmp(&a.post.created_at)
                .then(b.post.id.cmp(&a.post.id))
        });
        Ok(posts)
    }

    async fn delete_post(&self, id: PostId) -> anyhow::Result<bool> {
        let mut arena = self.arena.lock();
        if arena.posts.remove(&id).is_none() {
            return Ok(false);
        }
        arena.detach_replies(&[id]);
        Ok(true)
    }

    async fn delete_posts_containing(&self, keyword: &str) -> anyhow::Result<u64> {
        let mut arena = self.arena.lock();
        let doomed: Vec<PostId> = arena
            .posts
            .values()
            .filter(|p| p.content.contains(keyword))
            .map(|p| p.id)
            .collect();
        for id in &doomed {
            arena.posts.remove(id);
        }
        arena.detach_replies(&doomed);
        Ok(doomed.len() as u64)
    }

    async fn clear_posts(&self) -> anyhow::Result<()> {
        let mut arena = self.arena.lock();
        arena.posts.clear();
        arena.next_post_id = FIRST_ID;
        Ok(())
    }
}
