use crate::state::AppState;
use axum::Router;

pub mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;

pub use claims::Identity;
pub use extractors::{authorize, AuthUser};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
