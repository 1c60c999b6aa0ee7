//! Routes for driving end-to-end test suites. Mounted only when
//! `ENABLE_TESTING_ROUTES` is set.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use tracing::{instrument, warn};

use crate::{error::AppResult, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/testing/reset", post(reset))
}

#[instrument(skip(state))]
pub async fn reset(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.store.reset().await?;
    warn!("all users and blogs wiped");
    Ok(StatusCode::NO_CONTENT)
}
