use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::store::{Blog, User};

#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

/// Fields left out of the body keep their stored value. `"author": null`
/// clears the author.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub author: Option<Option<String>>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

/// Marks a field as supplied, so an explicit `null` becomes `Some(None)`.
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Serialize)]
pub struct BlogResponse {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub url: String,
    pub likes: i64,
    pub owner: Option<OwnerSummary>,
}

/// Projection of the owning user inlined into a blog.
#[derive(Debug, Serialize)]
pub struct OwnerSummary {
    pub username: String,
    pub name: Option<String>,
    pub id: Uuid,
}

impl From<&User> for OwnerSummary {
    fn from(u: &User) -> Self {
        Self {
            username: u.username.clone(),
            name: u.name.clone(),
            id: u.id,
        }
    }
}

impl BlogResponse {
    pub fn new(blog: Blog, owner: Option<&User>) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            author: blog.author,
            url: blog.url,
            likes: blog.likes,
            owner: owner.map(OwnerSummary::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_body_tells_null_author_from_missing_author() {
        let missing: UpdateBlogRequest = serde_json::from_str(r#"{"likes": 3}"#).unwrap();
        assert_eq!(missing.author, None);

        let cleared: UpdateBlogRequest = serde_json::from_str(r#"{"author": null}"#).unwrap();
        assert_eq!(cleared.author, Some(None));

        let set: UpdateBlogRequest = serde_json::from_str(r#"{"author": "Ada"}"#).unwrap();
        assert_eq!(set.author, Some(Some("Ada".to_string())));
    }
}
