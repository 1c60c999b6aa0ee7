use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::{
    auth::password::hash_password,
    error::{AppError, AppResult},
    store::{Blog, BlogStore, NewUser},
    users::dto::{CreateUserRequest, UserResponse},
};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 3;

fn validate(req: &CreateUserRequest) -> AppResult<(String, String)> {
    let username = match req.username.as_deref() {
        Some(u) if u.chars().count() >= MIN_USERNAME_LEN => u.to_string(),
        _ => {
            return Err(AppError::Validation(
                "Username must be at least 3 characters long".into(),
            ))
        }
    };
    let password = match req.password.as_deref() {
        Some(p) if p.chars().count() >= MIN_PASSWORD_LEN => p.to_string(),
        _ => {
            return Err(AppError::Validation(
                "Password must be at least 3 characters long".into(),
            ))
        }
    };
    Ok((username, password))
}

pub async fn create_user(store: &dyn BlogStore, req: CreateUserRequest) -> AppResult<UserResponse> {
    let (username, password) = validate(&req)?;

    // the store's unique index still catches a concurrent registration
    if store.find_user_by_username(&username).await?.is_some() {
        return Err(AppError::DuplicateUsername);
    }

    let password_hash = hash_password(&password)?;
    let user = store
        .create_user(NewUser {
            username,
            name: req.name,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(UserResponse::new(user, Vec::new()))
}

pub async fn list_users(store: &dyn BlogStore) -> AppResult<Vec<UserResponse>> {
    let users = store.list_users().await?;
    let mut by_owner: HashMap<Uuid, Vec<Blog>> = HashMap::new();
    for blog in store.list_blogs().await? {
        if let Some(owner) = blog.owner_id {
            by_owner.entry(owner).or_default().push(blog);
        }
    }

    Ok(users
        .into_iter()
        .map(|u| {
            let posts = by_owner.remove(&u.id).unwrap_or_default();
            UserResponse::new(u, posts)
        })
        .collect())
}

pub async fn find_user(store: &dyn BlogStore, id: Uuid) -> AppResult<UserResponse> {
    let user = store
        .find_user_by_id(id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;
    let posts = store.list_blogs_by_owner(user.id).await?;
    Ok(UserResponse::new(user, posts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NewBlog};

    fn request(username: Option<&str>, password: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            username: username.map(Into::into),
            name: Some("Test User".into()),
            password: password.map(Into::into),
        }
    }

    #[tokio::test]
    async fn rejects_short_or_missing_username() {
        let store = MemoryStore::new();
        for username in [None, Some(""), Some("ab")] {
            let err = create_user(&store, request(username, Some("password123")))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m.contains("Username")));
        }
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_short_or_missing_password() {
        let store = MemoryStore::new();
        for password in [None, Some("pw")] {
            let err = create_user(&store, request(Some("john_doe"), password))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m.contains("Password")));
        }
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_duplicate_username() {
        let store = MemoryStore::new();
        create_user(&store, request(Some("john_doe"), Some("password123")))
            .await
            .unwrap();
        let err = create_user(&store, request(Some("john_doe"), Some("other-pass")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stores_hash_not_plain_password() {
        let store = MemoryStore::new();
        let created = create_user(&store, request(Some("john_doe"), Some("password123")))
            .await
            .unwrap();
        let stored = store.find_user_by_id(created.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "password123");
        assert!(!stored.password_hash.is_empty());
        assert!(created.posts.is_empty());
    }

    #[tokio::test]
    async fn list_users_inlines_owned_posts() {
        let store = MemoryStore::new();
        let a = create_user(&store, request(Some("alice"), Some("secret")))
            .await
            .unwrap();
        let b = create_user(&store, request(Some("bob"), Some("secret")))
            .await
            .unwrap();
        store
            .insert_blog(NewBlog {
                title: "Rust".into(),
                author: Some("Alice".into()),
                url: "https://example.com/rust".into(),
                likes: 3,
                owner_id: a.id,
            })
            .await
            .unwrap();

        let users = list_users(&store).await.unwrap();
        let alice = users.iter().find(|u| u.id == a.id).unwrap();
        let bob = users.iter().find(|u| u.id == b.id).unwrap();
        assert_eq!(alice.posts.len(), 1);
        assert_eq!(alice.posts[0].title, "Rust");
        assert!(bob.posts.is_empty());
    }

    #[tokio::test]
    async fn find_user_reports_unknown_id() {
        let store = MemoryStore::new();
        let err = find_user(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("User not found")));
    }
}
