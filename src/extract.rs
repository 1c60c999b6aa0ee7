use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections render as our 400 `{error}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Parses a path id, treating anything that is not a UUID as a client error.
pub fn parse_id(raw: &str) -> Result<uuid::Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation("malformatted id".into()))
}
