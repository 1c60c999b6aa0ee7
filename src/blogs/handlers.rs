use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{BlogResponse, CreateBlogRequest, UpdateBlogRequest},
    services,
};
use crate::{
    auth::AuthUser,
    error::AppResult,
    extract::{parse_id, AppJson},
    state::AppState,
};

pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(list_blogs).post(create_blog))
        .route("/blogs/:id", put(update_blog).delete(delete_blog))
}

#[instrument(skip(state))]
pub async fn list_blogs(State(state): State<AppState>) -> AppResult<Json<Vec<BlogResponse>>> {
    let blogs = services::list_blogs(state.store.as_ref()).await?;
    Ok(Json(blogs))
}

#[instrument(skip(state, identity, payload), fields(user_id = %identity.id))]
pub async fn create_blog(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    AppJson(payload): AppJson<CreateBlogRequest>,
) -> AppResult<(StatusCode, Json<BlogResponse>)> {
    let blog = services::create_blog(state.store.as_ref(), &identity, payload).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

#[instrument(skip(state, payload))]
pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateBlogRequest>,
) -> AppResult<Json<BlogResponse>> {
    let blog = services::update_blog(state.store.as_ref(), parse_id(&id)?, payload).await?;
    Ok(Json(blog))
}

#[instrument(skip(state, identity), fields(user_id = %identity.id))]
pub async fn delete_blog(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    services::delete_blog(state.store.as_ref(), &identity, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
