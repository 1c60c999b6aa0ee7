use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::{auth::jwt::TokenError, store::StoreError};

/// Every failure a request can end with. Rendered by the `IntoResponse` impl below.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Username must be unique")]
    DuplicateUsername,

    #[error("token missing")]
    AuthenticationRequired,

    #[error("token invalid: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("token user no longer exists")]
    UnknownUser,

    #[error("only the creator can delete a blog")]
    Forbidden,

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateUsername => StatusCode::BAD_REQUEST,
            Self::AuthenticationRequired
            | Self::InvalidToken(_)
            | Self::InvalidCredentials
            | Self::UnknownUser => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                error!(error = ?e, "request failed");
                "internal server error".to_string()
            }
            Self::InvalidToken(_) => {
                warn!(%status, error = %self, "request rejected");
                "token invalid".to_string()
            }
            other => {
                warn!(%status, error = %other, "request rejected");
                other.to_string()
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateUsername => Self::DuplicateUsername,
            StoreError::Database(e) => Self::Internal(e.into()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}
