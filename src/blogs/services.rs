//! Blog writes and the ownership rules around them.

use std::collections::{hash_map::Entry, HashMap};

use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{BlogResponse, CreateBlogRequest, UpdateBlogRequest};
use crate::{
    auth::Identity,
    error::{AppError, AppResult},
    store::{BlogChanges, BlogStore, NewBlog, User},
};

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_likes(likes: Option<i64>) -> AppResult<()> {
    match likes {
        Some(l) if l < 0 => Err(AppError::Validation("likes must be non-negative".into())),
        _ => Ok(()),
    }
}

pub async fn list_blogs(store: &dyn BlogStore) -> AppResult<Vec<BlogResponse>> {
    // blogs first, so every owner they reference already exists when users are read
    let blogs = store.list_blogs().await?;
    let mut owners: HashMap<Uuid, User> = store
        .list_users()
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    for owner_id in blogs.iter().filter_map(|b| b.owner_id) {
        if let Entry::Vacant(slot) = owners.entry(owner_id) {
            if let Some(user) = store.find_user_by_id(owner_id).await? {
                slot.insert(user);
            }
        }
    }
    Ok(blogs
        .into_iter()
        .map(|b| {
            let owner = b.owner_id.and_then(|id| owners.get(&id));
            BlogResponse::new(b, owner)
        })
        .collect())
}

/// Creates a blog owned by `identity`. The new blog shows up in the owner's posts.
pub async fn create_blog(
    store: &dyn BlogStore,
    identity: &Identity,
    req: CreateBlogRequest,
) -> AppResult<BlogResponse> {
    let (Some(title), Some(url)) = (non_empty(req.title), non_empty(req.url)) else {
        return Err(AppError::Validation("Title and URL are required".into()));
    };
    check_likes(req.likes)?;

    let owner = store
        .find_user_by_id(identity.id)
        .await?
        .ok_or(AppError::UnknownUser)?;

    let blog = store
        .insert_blog(NewBlog {
            title,
            author: req.author,
            url,
            likes: req.likes.unwrap_or(0),
            owner_id: owner.id,
        })
        .await?;

    info!(blog_id = %blog.id, user_id = %owner.id, "blog created");
    Ok(BlogResponse::new(blog, Some(&owner)))
}

/// Replaces the supplied fields of a blog.
///
/// Unlike deletion this does not check ownership: any caller, anonymous
/// included, may edit any blog.
pub async fn update_blog(
    store: &dyn BlogStore,
    id: Uuid,
    req: UpdateBlogRequest,
) -> AppResult<BlogResponse> {
    if matches!(req.title.as_deref(), Some(t) if t.trim().is_empty())
        || matches!(req.url.as_deref(), Some(u) if u.trim().is_empty())
    {
        return Err(AppError::Validation("Title and URL must not be empty".into()));
    }
    check_likes(req.likes)?;

    let changes = BlogChanges {
        title: req.title,
        author: req.author,
        url: req.url,
        likes: req.likes,
    };
    let blog = store
        .update_blog(id, changes)
        .await?
        .ok_or(AppError::NotFound("Blog not found"))?;

    let owner = match blog.owner_id {
        Some(owner_id) => store.find_user_by_id(owner_id).await?,
        None => None,
    };
    info!(blog_id = %blog.id, "blog updated");
    Ok(BlogResponse::new(blog, owner.as_ref()))
}

/// Deletes a blog on behalf of its owner.
///
/// Blogs without an owner cannot be deleted by anyone.
pub async fn delete_blog(store: &dyn BlogStore, identity: &Identity, id: Uuid) -> AppResult<()> {
    let blog = store
        .find_blog(id)
        .await?
        .ok_or(AppError::NotFound("Blog not found"))?;

    if blog.owner_id != Some(identity.id) {
        warn!(blog_id = %id, user_id = %identity.id, "delete by non-owner refused");
        return Err(AppError::Forbidden);
    }

    if !store.delete_blog(id).await? {
        return Err(AppError::NotFound("Blog not found"));
    }
    info!(blog_id = %id, user_id = %identity.id, "blog deleted");
    Ok(())
}
