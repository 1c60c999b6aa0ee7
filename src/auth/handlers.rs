use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse},
        password::verify_password,
    },
    error::{AppError, AppResult},
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let Some(user) = state.store.find_user_by_username(&payload.username).await? else {
        warn!(username = %payload.username, "login unknown username");
        return Err(AppError::InvalidCredentials);
    };

    verify_password(&payload.password, &user.password_hash).inspect_err(|e| {
        if matches!(e, AppError::InvalidCredentials) {
            warn!(user_id = %user.id, "login invalid password");
        }
    })?;

    let token = state
        .keys
        .issue(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.into()))?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(LoginResponse {
        token,
        username: user.username,
        name: user.name,
        id: user.id,
    }))
}
