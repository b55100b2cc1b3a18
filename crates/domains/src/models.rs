//! # Domain Models
//!
//! These structs represent the core entities of the board.
//! Posts and users are identified by storage-assigned sequential integers;
//! the post id doubles as the public post number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::Role;

pub type PostId = i64;
pub type UserId = i64;

/// Hash segment shown for posts that carry no stored password hash.
pub const NO_HASH_SEGMENT: &str = "0000000";

/// Number of hash characters appended to a rendered name.
pub const HASH_SEGMENT_LEN: usize = 7;

/// Timestamp layout used in post views.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A poster account, created lazily on the first post under a username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Placeholder login credential; nothing verifies it yet
    pub password_hash: Option<String>,
    pub role: Role,
    pub is_killed: bool,
    pub is_banned: bool,
    /// Suffix appended to the display name by `/add`
    pub additional_text: Option<String>,
    pub display_color: String,
    pub last_post_time: Option<DateTime<Utc>>,
}

/// Fields needed to create a [`User`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// A single message on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// Display name as typed by the poster
    pub name: String,
    pub content: String,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<UserId>,
    /// Post this one replies to
    pub parent_id: Option<PostId>,
}

/// Fields needed to insert a [`Post`]; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub name: String,
    pub content: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
    pub parent_id: Option<PostId>,
}

/// A post joined with the author fields its view needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PostWithAuthor {
    pub post: Post,
    pub additional_text: Option<String>,
    /// `None` when the post has no owning user
    pub author_role: Option<Role>,
}

/// Public JSON representation of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub no: PostId,
    /// `raw_name + additional_text + "@" + hash segment`
    pub name: String,
    pub raw_name: String,
    pub additional_text: Option<String>,
    pub content: String,
    pub time: String,
    pub parent_id: Option<PostId>,
    pub user_role: Role,
}

impl PostWithAuthor {
    pub fn to_view(&self) -> PostView {
        let post = &self.post;
        let segment = post
            .password_hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .map(|h| h.chars().take(HASH_SEGMENT_LEN).collect::<String>())
            .unwrap_or_else(|| NO_HASH_SEGMENT.to_string());
        let suffix = self.additional_text.as_deref().unwrap_or_default();

        PostView {
            no: post.id,
            name: format!("{}{}@{}", post.name, suffix, segment),
            raw_name: post.name.clone(),
            additional_text: self.additional_text.clone(),
            content: post.content.clone(),
            time: post.created_at.format(TIME_FORMAT).to_string(),
            parent_id: post.parent_id,
            user_role: self.author_role.unwrap_or_default(),
        }
    }
}
