//! # SQLite implementation of `BoardRepo`
//!
//! Maps the `users` / `posts` tables onto the domain models. Post numbers
//! come from an `AUTOINCREMENT` key so deleted numbers are never reused
//! until `clear_posts` resets the sequence.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use domains::{
    BoardRepo, NewPost, NewUser, Post, PostId, PostWithAuthor, Role, User, UserId,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::info;

const POST_COLUMNS: &str = "SELECT p.id, p.name, p.content, p.password_hash, p.created_at, \
     p.user_id, p.parent_id, u.additional_text, u.role AS user_role \
     FROM posts p LEFT JOIN users u ON u.id = p.user_id";

#[derive(Debug, Clone)]
pub struct SqliteBoardRepo {
    pool: SqlitePool,
}

impl SqliteBoardRepo {
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Opens (creating if missing) the database at `url` and runs migrations.
    ///
    /// In-memory URLs get a single connection that is never recycled, since
    /// every new connection would see an empty database.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid sqlite url {url:?}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };
        let pool = pool_options
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .context("failed to open sqlite database")?;

        let repo = Self::from_pool(pool);
        repo.migrate().await?;
        info!(in_memory, "sqlite board store ready");
        Ok(repo)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run migrations")
    }
}

fn user_from_row(row: &SqliteRow) -> anyhow::Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse()?,
        is_killed: row.try_get("is_killed")?,
        is_banned: row.try_get("is_banned")?,
        additional_text: row.try_get("additional_text")?,
        display_color: row.try_get("display_color")?,
        last_post_time: row.try_get("last_post_time")?,
    })
}

fn post_from_row(row: &SqliteRow) -> anyhow::Result<PostWithAuthor> {
    let author_role = row
        .try_get::<Option<String>, _>("user_role")?
        .map(|r| r.parse::<Role>())
        .transpose()?;
    Ok(PostWithAuthor {
        post: Post {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            content: row.try_get("content")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
            user_id: row.try_get("user_id")?,
            parent_id: row.try_get("parent_id")?,
        },
        additional_text: row.try_get("additional_text")?,
        author_role,
    })
}

#[async_trait]
impl BoardRepo for SqliteBoardRepo {
    async fn find_user(&self, username: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_user(&self, user: NewUser) -> anyhow::Result<User> {
        let id = sqlx::query("INSERT INTO users (username, password_hash, role) VALUES (?, ?, ?)")
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to create user {:?}", user.username))?
            .last_insert_rowid();

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        user_from_row(&row)
    }

    async fn set_role(&self, user_id: UserId, role: Role) -> anyhow::Result<()> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            bail!("user {user_id} does not exist");
        }
        Ok(())
    }

    async fn set_additional_text(&self, user_id: UserId, text: &str) -> anyhow::Result<()> {
        let result = sqlx::query("UPDATE users SET additional_text = ? WHERE id = ?")
            .bind(text)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            bail!("user {user_id} does not exist");
        }
        Ok(())
    }

    /// Insert and cooldown stamp share a transaction; dropping `tx` on any
    /// early return rolls both back.
    async fn create_post(&self, post: NewPost) -> anyhow::Result<Post> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            "INSERT INTO posts (name, content, password_hash, created_at, user_id, parent_id) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&post.name)
        .bind(&post.content)
        .bind(&post.password_hash)
        .bind(post.created_at)
        .bind(post.user_id)
        .bind(post.parent_id)
        .execute(&mut *tx)
        .await
        .context("failed to insert post")?
        .last_insert_rowid();

        let touched = sqlx::query("UPDATE users SET last_post_time = ? WHERE id = ?")
            .bind(post.created_at)
            .bind(post.user_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            bail!("user {} does not exist", post.user_id);
        }

        tx.commit().await?;

        Ok(Post {
            id,
            name: post.name,
            content: post.content,
            password_hash: Some(post.password_hash),
            created_at: post.created_at,
            user_id: Some(post.user_id),
            parent_id: post.parent_id,
        })
    }

    async fn get_post(&self, id: PostId) -> anyhow::Result<Option<PostWithAuthor>> {
        let row = sqlx::query(&format!("{POST_COLUMNS} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn list_posts(&self) -> anyhow::Result<Vec<PostWithAuthor>> {
        sqlx::query(&format!("{POST_COLUMNS} ORDER BY p.created_at DESC, p.id DESC"))
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(post_from_row)
            .collect()
    }

    async fn delete_post(&self, id: PostId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_posts_containing(&self, keyword: &str) -> anyhow::Result<u64> {
        // instr() is a byte match: case-sensitive and free of LIKE wildcards.
        let result = sqlx::query("DELETE FROM posts WHERE instr(content, ?) > 0")
            .bind(keyword)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn clear_posts(&self) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM posts").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'posts'")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
