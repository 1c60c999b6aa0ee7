use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Blog, User};

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user. The password hash never reaches this type.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub posts: Vec<BlogSummary>,
}

/// Projection of a blog inlined into a user.
#[derive(Debug, Serialize)]
pub struct BlogSummary {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub url: String,
}

impl From<Blog> for BlogSummary {
    fn from(b: Blog) -> Self {
        Self {
            id: b.id,
            title: b.title,
            author: b.author,
            url: b.url,
        }
    }
}

impl UserResponse {
    pub fn new(user: User, posts: Vec<Blog>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            posts: posts.into_iter().map(BlogSummary::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn user_response_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "john_doe".into(),
            name: Some("John".into()),
            password_hash: "$argon2id$v=19$secret".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(UserResponse::new(user, vec![])).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        assert!(json.get("password_hash").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("_id").is_none());
        assert_eq!(json["username"], "john_doe");
        assert_eq!(json["posts"], serde_json::json!([]));
    }
}
