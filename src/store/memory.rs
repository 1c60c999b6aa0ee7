use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Blog, BlogChanges, BlogStore, NewBlog, NewUser, StoreError, StoreResult, User};

#[derive(Default)]
struct Tables {
    // insertion order doubles as creation order
    users: Vec<User>,
    blogs: Vec<Blog>,
}

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::DuplicateUsername);
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            name: user.name,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn list_blogs(&self) -> StoreResult<Vec<Blog>> {
        Ok(self.tables.read().await.blogs.clone())
    }

    async fn list_blogs_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Blog>> {
        let tables = self.tables.read().await;
        Ok(tables
            .blogs
            .iter()
            .filter(|b| b.owner_id == Some(owner_id))
            .cloned()
            .collect())
    }

    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>> {
        let tables = self.tables.read().await;
        Ok(tables.blogs.iter().find(|b| b.id == id).cloned())
    }

    async fn insert_blog(&self, blog: NewBlog) -> StoreResult<Blog> {
        let created = Blog {
            id: Uuid::new_v4(),
            title: blog.title,
            author: blog.author,
            url: blog.url,
            likes: blog.likes,
            owner_id: Some(blog.owner_id),
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.blogs.push(created.clone());
        Ok(created)
    }

    async fn update_blog(&self, id: Uuid, changes: BlogChanges) -> StoreResult<Option<Blog>> {
        let mut tables = self.tables.write().await;
        let Some(blog) = tables.blogs.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            blog.title = title;
        }
        if let Some(author) = changes.author {
            blog.author = author;
        }
        if let Some(url) = changes.url {
            blog.url = url;
        }
        if let Some(likes) = changes.likes {
            blog.likes = likes;
        }
        Ok(Some(blog.clone()))
    }

    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.blogs.len();
        tables.blogs.retain(|b| b.id != id);
        Ok(tables.blogs.len() < before)
    }

    async fn reset(&self) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.blogs.clear();
        tables.users.clear();
        Ok(())
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Inserts a blog with no owner, the shape legacy records have.
    pub(crate) async fn insert_unowned_blog(&self, title: &str, url: &str) -> Blog {
        let blog = Blog {
            id: Uuid::new_v4(),
            title: title.into(),
            author: None,
            url: url.into(),
            likes: 0,
            owner_id: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.blogs.push(blog.clone());
        blog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            name: None,
            password_hash: "$argon2id$fake".into(),
        }
    }

    fn new_blog(title: &str, owner_id: Uuid) -> NewBlog {
        NewBlog {
            title: title.into(),
            author: None,
            url: format!("https://example.com/{title}"),
            likes: 0,
            owner_id,
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_username() {
        let store = MemoryStore::new();
        store.create_user(new_user("mluukkai")).await.unwrap();
        let err = store.create_user(new_user("mluukkai")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blogs_by_owner_keep_creation_order() {
        let store = MemoryStore::new();
        let a = store.create_user(new_user("alice")).await.unwrap();
        let b = store.create_user(new_user("bob")).await.unwrap();
        store.insert_blog(new_blog("first", a.id)).await.unwrap();
        store.insert_blog(new_blog("other", b.id)).await.unwrap();
        store.insert_blog(new_blog("second", a.id)).await.unwrap();

        let titles: Vec<_> = store
            .list_blogs_by_owner(a.id)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, ["first", "second"]);
    }

    #[tokio::test]
    async fn update_only_touches_supplied_fields() {
        let store = MemoryStore::new();
        let owner = store.create_user(new_user("alice")).await.unwrap();
        let blog = store.insert_blog(new_blog("title", owner.id)).await.unwrap();

        let updated = store
            .update_blog(
                blog.id,
                BlogChanges {
                    likes: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.likes, 7);
        assert_eq!(updated.title, "title");
        assert!(store
            .update_blog(Uuid::new_v4(), BlogChanges::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_can_clear_author() {
        let store = MemoryStore::new();
        let owner = store.create_user(new_user("alice")).await.unwrap();
        let mut blog = new_blog("title", owner.id);
        blog.author = Some("Alice".into());
        let blog = store.insert_blog(blog).await.unwrap();

        let kept = store
            .update_blog(blog.id, BlogChanges::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.author.as_deref(), Some("Alice"));

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
    }

    #[tokio::test]
    async fn delete_reports_whether_a_blog_was_removed() {
        let store = MemoryStore::new();
        let owner = store.create_user(new_user("alice")).await.unwrap();
        let blog = store.insert_blog(new_blog("title", owner.id)).await.unwrap();
        assert!(store.delete_blog(blog.id).await.unwrap());
        assert!(!store.delete_blog(blog.id).await.unwrap());
    }

    #[tokio::test]
    async fn reset_wipes_everything() {
        let store = MemoryStore::new();
        let owner = store.create_user(new_user("alice")).await.unwrap();
        store.insert_blog(new_blog("title", owner.id)).await.unwrap();
        store.reset().await.unwrap();
        assert!(store.list_users().await.unwrap().is_empty());
        assert!(store.list_blogs().await.unwrap().is_empty());
    }
}
