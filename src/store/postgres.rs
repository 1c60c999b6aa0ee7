use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{Blog, BlogChanges, BlogStore, NewBlog, NewUser, StoreError, StoreResult, User};

const USER_COLUMNS: &str = "id, username, name, password_hash, created_at";
const BLOG_COLUMNS: &str = "id, title, author, url, likes, owner_id, created_at";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

fn map_unique_violation(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateUsername,
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (id, username, name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.name)
            .bind(&user.password_hash)
            .fetch_one(&self.db)
            .await
            .map_err(map_unique_violation)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.db).await?;
        Ok(users)
    }

    async fn list_blogs(&self) -> StoreResult<Vec<Blog>> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs ORDER BY created_at ASC, id ASC");
        let blogs = sqlx::query_as::<_, Blog>(&sql).fetch_all(&self.db).await?;
        Ok(blogs)
    }

    async fn list_blogs_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Blog>> {
        let sql = format!(
            r#"
            SELECT {BLOG_COLUMNS}
              FROM blogs
             WHERE owner_id = $1
             ORDER BY created_at ASC, id ASC
            "#
        );
        let blogs = sqlx::query_as::<_, Blog>(&sql)
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?;
        Ok(blogs)
    }

    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1");
        let blog = sqlx::query_as::<_, Blog>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(blog)
    }

    async fn insert_blog(&self, blog: NewBlog) -> StoreResult<Blog> {
        let sql = format!(
            r#"
            INSERT INTO blogs (id, title, author, url, likes, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BLOG_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Blog>(&sql)
            .bind(Uuid::new_v4())
            .bind(&blog.title)
            .bind(&blog.author)
            .bind(&blog.url)
            .bind(blog.likes)
            .bind(blog.owner_id)
            .fetch_one(&self.db)
            .await?;
        Ok(created)
    }

    async fn update_blog(&self, id: Uuid, changes: BlogChanges) -> StoreResult<Option<Blog>> {
        let sql = format!(
            r#"
            UPDATE blogs
               SET title = COALESCE($2, title),
                   author = CASE WHEN $6 THEN $3 ELSE author END,
                   url = COALESCE($4, url),
                   likes = COALESCE($5, likes)
             WHERE id = $1
            RETURNING {BLOG_COLUMNS}
            "#
        );
        let author_supplied = changes.author.is_some();
        let updated = sqlx::query_as::<_, Blog>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.author.flatten())
            .bind(changes.url)
            .bind(changes.likes)
            .bind(author_supplied)
            .fetch_optional(&self.db)
            .await?;
        Ok(updated)
    }

    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reset(&self) -> StoreResult<()> {
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM blogs").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use sqlx::error::{DatabaseError, ErrorKind};
    use thiserror::Error;

    use super::*;

    #[derive(Debug, Error)]
    #[error("{message}")]
    struct FakeDbError {
        message: &'static str,
        unique: bool,
    }

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            self.message
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::CheckViolation
            }
        }
    }

    fn db_error(message: &'static str, unique: bool) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { message, unique }))
    }

    #[test]
    fn unique_violation_becomes_duplicate_username() {
        let err = map_unique_violation(db_error(
            "duplicate key value violates unique constraint \"users_username_key\"",
            true,
        ));
        assert!(matches!(err, StoreError::DuplicateUsername));
    }

    #[test]
    fn other_database_errors_pass_through() {
        let err = map_unique_violation(db_error(
            "new row violates check constraint",
            false,
        ));
        assert!(matches!(err, StoreError::Database(sqlx::Error::Database(_))));

        let err = map_unique_violation(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }

    /// Runs against the database in `TEST_DATABASE_URL`, which it wipes.
    #[tokio::test]
    #[ignore = "needs a disposable Postgres in TEST_DATABASE_URL"]
    async fn round_trip_against_postgres() {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL");
        let store = PgStore::connect(&url).await.unwrap();
        store.migrate().await.unwrap();
        store.reset().await.unwrap();

        let new_user = || NewUser {
            username: "mluukkai".into(),
            name: Some("Matti Luukkainen".into()),
            password_hash: "$argon2id$fake".into(),
        };
        let user = store.create_user(new_user()).await.unwrap();
        let err = store.create_user(new_user()).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));

        let blog = store
            .insert_blog(NewBlog {
                title: "Go To Statement Considered Harmful".into(),
                author: Some("Edsger W. Dijkstra".into()),
                url: "https://example.com/goto".into(),
                likes: 5,
                owner_id: user.id,
            })
            .await
            .unwrap();
        assert_eq!(store.list_blogs_by_owner(user.id).await.unwrap().len(), 1);

        let kept = store
            .update_blog(
                blog.id,
                BlogChanges {
                    likes: Some(6),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.likes, 6);
        assert_eq!(kept.author.as_deref(), Some("Edsger W. Dijkstra"));

        let cleared = store
            .update_blog(
                blog.id,
                BlogChanges {
                    author: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cleared.author, None);
        assert_eq!(cleared.likes, 6);

        assert!(store.delete_blog(blog.id).await.unwrap());
        assert!(!store.delete_blog(blog.id).await.unwrap());
        store.reset().await.unwrap();
        assert!(store.list_users().await.unwrap().is_empty());
    }
}
