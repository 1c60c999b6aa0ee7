//! Storage seam for users and blogs.
//!
//! A user's posts are not stored on the user record; they are the blogs whose
//! `owner_id` points at the user, ordered by creation. Creating or deleting a
//! blog is therefore a single write and the two sides cannot drift apart.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record as persisted.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub password_hash: String, // Argon2 PHC string
    pub created_at: OffsetDateTime,
}

/// Blog post record as persisted.
#[derive(Debug, Clone, FromRow)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub url: String,
    pub likes: i64,
    pub owner_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub author: Option<String>,
    pub url: String,
    pub likes: i64,
    pub owner_id: Uuid,
}

/// Partial replacement; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct BlogChanges {
    pub title: Option<String>,
    /// `Some(None)` clears the author.
    pub author: Option<Option<String>>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already taken")]
    DuplicateUsername,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait BlogStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn list_blogs(&self) -> StoreResult<Vec<Blog>>;
    async fn list_blogs_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Blog>>;
    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>>;
    async fn insert_blog(&self, blog: NewBlog) -> StoreResult<Blog>;
    async fn update_blog(&self, id: Uuid, changes: BlogChanges) -> StoreResult<Option<Blog>>;
    /// Returns `false` when no blog had this id.
    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool>;

    /// Wipes every user and blog.
    async fn reset(&self) -> StoreResult<()>;
}
